use std::future::pending;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use mydoc_cli::{next_question, ChatInput};

#[tokio::test]
async fn reads_questions_and_skips_blank_lines() {
    let (mut stdin, input) = tokio::io::duplex(256);
    stdin.write_all(b"\n   \n What did the cat do? \nquit\n").await.unwrap();
    let mut lines = BufReader::new(input).lines();
    let mut out = Vec::new();

    let first = next_question(&mut lines, &mut out, pending()).await.unwrap();
    assert_eq!(first, ChatInput::Question("What did the cat do?".to_string()));
    assert_eq!(next_question(&mut lines, &mut out, pending()).await.unwrap(), ChatInput::Exit);
    assert!(String::from_utf8(out).unwrap().contains("> "));
}

#[tokio::test]
async fn end_of_input_exits() {
    let (stdin, input) = tokio::io::duplex(64);
    drop(stdin);
    let mut lines = BufReader::new(input).lines();
    assert_eq!(next_question(&mut lines, &mut Vec::new(), pending()).await.unwrap(), ChatInput::Exit);
}

#[tokio::test]
async fn interrupt_at_an_idle_prompt_exits() {
    // writer stays open, so no line ever arrives
    let (_stdin, input) = tokio::io::duplex(64);
    let mut lines = BufReader::new(input).lines();
    let outcome = next_question(&mut lines, &mut Vec::new(), async {}).await.unwrap();
    assert_eq!(outcome, ChatInput::Exit);
}

#[tokio::test]
async fn interrupt_works_on_every_prompt() {
    let (mut stdin, input) = tokio::io::duplex(64);
    stdin.write_all(b"first\n").await.unwrap();
    let mut lines = BufReader::new(input).lines();
    let mut out = Vec::new();

    let first = next_question(&mut lines, &mut out, pending()).await.unwrap();
    assert_eq!(first, ChatInput::Question("first".to_string()));
    assert_eq!(next_question(&mut lines, &mut out, async {}).await.unwrap(), ChatInput::Exit);
}
