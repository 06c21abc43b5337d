//! Terminal implementation of the core `Prompt` port.
//!
//! With the `interactive` feature the questions go through `dialoguer`;
//! without it a plain `[Y/n]` line is read from stdin.

use mcflow_core::{
    application::{ApplicationError, ports::Prompt},
    error::McflowResult,
};

pub struct TerminalPrompt;

fn prompt_failed(e: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::PromptFailed {
        reason: e.to_string(),
    }
}

#[cfg(feature = "interactive")]
impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str, default: bool) -> McflowResult<bool> {
        use dialoguer::{Confirm, theme::ColorfulTheme};

        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(|e| prompt_failed(e).into())
    }

    fn select(&self, message: &str, options: &[String], default: usize) -> McflowResult<usize> {
        use dialoguer::{Select, theme::ColorfulTheme};

        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(message)
            .items(options)
            .default(default)
            .interact()
            .map_err(|e| prompt_failed(e).into())
    }
}

#[cfg(not(feature = "interactive"))]
impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str, default: bool) -> McflowResult<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let answer = read_answer(&format!("{message} {hint} "))?;
        Ok(match answer.as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }

    fn select(&self, message: &str, options: &[String], default: usize) -> McflowResult<usize> {
        println!("{message}");
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }
        let answer = read_answer(&format!("Choice [{}]: ", default + 1))?;
        if answer.is_empty() {
            return Ok(default);
        }
        answer
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=options.len()).contains(n))
            .map(|n| n - 1)
            .ok_or_else(|| prompt_failed(format!("'{answer}' is not one of the choices")).into())
    }
}

#[cfg(not(feature = "interactive"))]
fn read_answer(question: &str) -> McflowResult<String> {
    use std::io::{self, Write};

    print!("{question}");
    io::stdout().flush().map_err(prompt_failed)?;

    let mut input = String::new();
    let read = io::stdin().read_line(&mut input).map_err(prompt_failed)?;
    if read == 0 {
        return Err(prompt_failed("no input available (stdin closed)").into());
    }
    Ok(input.trim().to_ascii_lowercase())
}
