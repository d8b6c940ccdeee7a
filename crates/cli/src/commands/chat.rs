//! Interactive chat REPL.

use std::io::{BufRead, Write};

use stylevault_clerk::llm::ChatMessage;
use stylevault_clerk::{ClerkConfig, ClerkService, MemoryCart, StoreActions};
use stylevault_core::Catalog;

/// Run the chat loop until EOF or an exit command.
///
/// Without a usable `GROQ_API_KEY` the clerk still starts; every message is
/// answered with the setup hint.
pub async fn run(catalog: Catalog) -> Result<(), Box<dyn std::error::Error>> {
    let service = ClerkService::from_env(catalog.clone()).unwrap_or_else(|e| {
        tracing::warn!("no usable API key: {e}");
        ClerkService::from_config(ClerkConfig::new(""), catalog)
    });
    let mut cart = MemoryCart::new();
    let mut history: Vec<ChatMessage> = Vec::new();

    println!("Welcome to StyleVault! Type a message, or 'quit' to leave.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("you> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "quit" | "exit" | "bye") {
            println!("clerk> Come back soon! 👋");
            break;
        }

        let result = service.process(&history, message, &mut cart).await;
        history = result.updated_history;

        for action in &result.actions {
            println!("  · ran {}", action.function);
        }
        println!("clerk> {}", result.reply);

        let totals = cart.cart_totals();
        if !cart.cart_items().is_empty() {
            println!(
                "  [cart: {} line(s), total ${}]",
                cart.cart_items().len(),
                totals.total.round_dp(2)
            );
        }
    }

    Ok(())
}
