use clap::Parser;
use dotenv::dotenv;
use portfolio_chatbot::history::Role;
use portfolio_chatbot::widget::{ ChatWidget, DisplaySink };
use std::error::Error;
use std::io::{ self, BufRead, Write };

/// Terminal chat client for the chatbot gateway.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct WidgetArgs {
    /// Gateway endpoint to send conversation turns to.
    #[arg(long, env = "GATEWAY_URL", default_value = "http://127.0.0.1:8787/")]
    gateway_url: String,
}

/// Prints streamed deltas in place as the answer grows.
struct TerminalSink {
    printed: usize,
}

impl DisplaySink for TerminalSink {
    fn push_turn(&mut self, role: Role, _content: &str) {
        match role {
            // the user's line is already on screen from the prompt
            Role::User => {}
            Role::Assistant => {
                println!();
                self.printed = 0;
            }
        }
    }

    fn replace_answer(&mut self, text: &str) {
        // the accumulated answer only ever grows, so print the new suffix
        let mut out = io::stdout();
        let _ = out.write_all(text[self.printed..].as_bytes());
        let _ = out.flush();
        self.printed = text.len();
    }

    fn show_error(&mut self, message: &str) {
        if self.printed > 0 {
            println!();
            self.printed = 0;
        }
        eprintln!("error: {}", message);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = WidgetArgs::parse();

    println!("Chatting via {}. Type a message; Ctrl-D quits.", args.gateway_url);

    let mut widget = ChatWidget::new(args.gateway_url);
    let mut sink = TerminalSink { printed: 0 };
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        widget.submit(&line, &mut sink).await;
    }

    Ok(())
}
