//! Interactive CLI mode

use crate::commands::{Cli, CommandExecutor, CommandResult};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};

/// Interactive CLI session; pipeline, threat model and checklist persist between commands
pub struct InteractiveSession {
    executor: CommandExecutor,
}

impl InteractiveSession {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    /// Start interactive session
    pub async fn run(&mut self) -> Result<()> {
        println!("Welcome to DevSecOps CLI Interactive Mode");
        println!("Type 'help' for available commands, 'quit' to exit");
        println!("{}", "=".repeat(50));

        loop {
            print!("devsecops> ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();

            if input.is_empty() {
                continue;
            }

            match input {
                "quit" | "exit" | "q" => {
                    println!("Goodbye!");
                    break;
                }
                "help" | "h" => {
                    self.show_help();
                }
                "clear" => {
                    print!("\x1B[2J\x1B[1;1H");
                }
                _ => match self.execute_line(input).await {
                    Ok(Some(result)) if !result.message.is_empty() => println!("{}", result.message),
                    Ok(_) => {}
                    Err(e) => eprintln!("Error: {}", e),
                },
            }
        }

        Ok(())
    }

    /// Parse one input line with the regular command definitions and run it.
    ///
    /// Returns `None` when the line did not parse (the parse error is printed).
    pub async fn execute_line(&mut self, input: &str) -> Result<Option<CommandResult>> {
        let mut args = vec!["devsecops".to_string()];
        args.extend(shell_words::split(input)?);

        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => {
                eprintln!("{}", e);
                return Ok(None);
            }
        };

        if cli.config.is_some() {
            eprintln!("--config only applies when starting the session; ignoring it");
        }

        match cli.command {
            Some(command) => Ok(Some(self.executor.execute(command).await?)),
            None => Ok(None),
        }
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    fn show_help(&self) {
        println!("Available commands:");
        println!("  pipeline tools|attach|detach|configure|gate|sample|show|score|export");
        println!("  threat place|remove|move|status|list|templates|score|risk|report");
        println!("  checklist list|toggle|progress");
        println!("  info                Show system information");
        println!("  help                Show this help");
        println!("  clear               Clear screen");
        println!("  quit                Exit interactive mode");
        println!();
        println!("Use '<command> --help' for detailed help on each command");
    }
}

/// Start interactive mode
pub async fn start_interactive(executor: CommandExecutor) -> Result<()> {
    let mut session = InteractiveSession::new(executor);
    session.run().await
}
