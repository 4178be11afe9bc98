//! Drive a calculator session from the terminal.
//!
//! Each line is split on whitespace and every token is pressed as a keypad
//! label, e.g. `7 + 3 =` or `1 6 √`. `history` lists recent results and
//! `quit` exits.
//!
//! Set `CALCULATOR_SAVE_URL` (e.g. `http://127.0.0.1:8080/calculations`) to
//! save every result remotely.
//!
//! Run with: `RUST_LOG=info cargo run --example keypad_repl`

use std::sync::Arc;

use async_trait::async_trait;
use scicalc::{
    CalculatorEngine, CalculatorEvent, CalculatorSession, EventHandler, SaveClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};

struct SaveNotifier;

#[async_trait]
impl EventHandler for SaveNotifier {
    async fn on_calculator_event(&self, event: &CalculatorEvent) {
        if let CalculatorEvent::SaveCompleted {
            expression,
            success,
            error,
            ..
        } = event
        {
            if *success {
                println!("  (saved '{}')", expression);
            } else {
                println!(
                    "  (save failed: {})",
                    error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    scicalc::init_logger();

    let mut session =
        CalculatorSession::new(CalculatorEngine::new()).with_event_handler(Arc::new(SaveNotifier));
    if let Ok(url) = std::env::var("CALCULATOR_SAVE_URL") {
        session = session.with_save_client(SaveClient::new(url));
    }
    let handle = session.spawn();

    println!("scicalc: type keys separated by spaces, 'history' or 'quit'");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "quit" | "exit" => break,
            "history" => {
                let snapshot = handle.snapshot().await?;
                for (i, entry) in snapshot.history.iter().take(10).enumerate() {
                    println!(
                        "  #{} {} = {}  [{}]",
                        i,
                        entry.expression,
                        entry.result,
                        entry.timestamp.format("%H:%M:%S")
                    );
                }
                continue;
            }
            _ => {}
        }

        for label in line.split_whitespace() {
            if let Err(e) = handle.press(label).await {
                println!("  {}", e);
            }
        }

        let snapshot = handle.snapshot().await?;
        match snapshot.preview {
            Some(preview) => println!("{:>24}\n{:>24}", preview, snapshot.display),
            None => println!("{:>24}", snapshot.display),
        }
    }

    Ok(())
}
