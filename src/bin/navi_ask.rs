//! navi-ask: command-line client for a running navi-guide server.
//!
//! Sends one message (from arguments or stdin) and prints Navi's reply.
//! The session id is remembered in ~/.navi-ask-session so consecutive calls
//! share one conversation.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "navi-ask", about = "Ask Navi a question")]
struct Args {
    /// Base URL of the navi-guide server
    #[arg(long, default_value = "http://127.0.0.1:7860")]
    server: String,

    /// Session id (defaults to the remembered one)
    #[arg(long)]
    session: Option<String>,

    /// Start a fresh session
    #[arg(long)]
    new: bool,

    /// Switch the session's region before asking
    #[arg(long)]
    region: Option<String>,

    /// Switch the session's language before asking
    #[arg(long)]
    language: Option<String>,

    /// Ask the one-shot solver for this dungeon instead of chatting
    #[arg(long)]
    solve: Option<String>,

    /// Print a spoken summary of the session's questions
    #[arg(long)]
    summarize: bool,

    /// Message text; read from stdin when empty
    message: Vec<String>,
}

// --- API requests ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Serialize)]
struct SolveRequest<'a> {
    dungeon: &'a str,
    question: &'a str,
}

// --- API responses ---

#[derive(Deserialize)]
struct SessionResponse {
    session_id: String,
}

#[derive(Deserialize)]
struct ChatReply {
    rows: Vec<(Option<String>, Option<String>)>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct SolveResponse {
    dungeon: String,
    answer: String,
}

#[derive(Deserialize)]
struct SpokenText {
    text: String,
    audio_path: String,
}

type AskResult<T> = Result<T, Box<dyn std::error::Error>>;

fn session_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".navi-ask-session")
}

fn remembered_session() -> Option<String> {
    fs::read_to_string(session_file())
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

async fn check(resp: reqwest::Response) -> AskResult<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let message = body["error"].as_str().unwrap_or("request failed").to_string();
    Err(format!("{status}: {message}").into())
}

async fn session_id(client: &Client, args: &Args) -> AskResult<String> {
    if let Some(id) = &args.session {
        return Ok(id.clone());
    }
    if !args.new {
        if let Some(id) = remembered_session() {
            return Ok(id);
        }
    }
    let url = format!("{}/sessions", args.server.trim_end_matches('/'));
    let resp = check(client.post(url).send().await?).await?;
    let created: SessionResponse = resp.json().await?;
    let _ = fs::write(session_file(), &created.session_id);
    Ok(created.session_id)
}

fn read_message(args: &Args) -> AskResult<String> {
    if !args.message.is_empty() {
        return Ok(args.message.join(" "));
    }
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input.trim().to_string())
}

async fn run(args: Args) -> AskResult<()> {
    let client = Client::builder().timeout(Duration::from_secs(120)).build()?;
    let server = args.server.trim_end_matches('/').to_string();

    if let Some(dungeon) = &args.solve {
        let question = read_message(&args)?;
        let resp = client
            .post(format!("{server}/solve"))
            .json(&SolveRequest {
                dungeon,
                question: &question,
            })
            .send()
            .await?;
        let solved: SolveResponse = check(resp).await?.json().await?;
        println!("[{}]\n{}", solved.dungeon, solved.answer);
        return Ok(());
    }

    let id = session_id(&client, &args).await?;

    if let Some(region) = &args.region {
        let resp = client
            .post(format!("{server}/sessions/{id}/region"))
            .json(&serde_json::json!({ "region": region }))
            .send()
            .await?;
        check(resp).await?;
    }
    if let Some(language) = &args.language {
        let resp = client
            .post(format!("{server}/sessions/{id}/language"))
            .json(&serde_json::json!({ "language": language }))
            .send()
            .await?;
        check(resp).await?;
    }

    if args.summarize {
        let resp = client.post(format!("{server}/sessions/{id}/summarize")).send().await?;
        let spoken: SpokenText = check(resp).await?.json().await?;
        println!("{}\n({})", spoken.text, spoken.audio_path);
        return Ok(());
    }

    let message = read_message(&args)?;
    if message.is_empty() {
        return Err("nothing to ask".into());
    }

    let resp = client
        .post(format!("{server}/sessions/{id}/chat"))
        .json(&ChatRequest { message: &message })
        .send()
        .await?;
    let reply: ChatReply = check(resp).await?.json().await?;

    if let Some(err) = reply.error {
        return Err(err.into());
    }
    if let Some((_, Some(answer))) = reply.rows.last() {
        println!("{answer}");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("navi-ask: {e}");
        std::process::exit(1);
    }
}
