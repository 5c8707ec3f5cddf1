//! Shared CLI helpers — colored status lines and the final answer box.

use colored::Colorize;

pub fn print_status(msg: &str) {
    println!("{}", msg.cyan());
}

pub fn print_info(msg: &str) {
    println!("{}", msg.blue());
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg.green());
}

pub fn print_warning(msg: &str) {
    eprintln!("{}", msg.yellow());
}

pub fn print_failure(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print the agent's final answer between rules.
pub fn print_final_answer(answer: &str) {
    let rule = "=".repeat(50);
    println!();
    println!("{rule}");
    println!("{}", "FINAL ANSWER:".bold());
    println!("{rule}");
    if answer.is_empty() {
        println!("{}", "(no answer)".dimmed());
    } else {
        println!("{answer}");
    }
    println!("{rule}");
}

/// `✓` or a red marker for a yes/no status column.
pub fn check_mark(ok: bool, missing: &str) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        missing.red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_mark_text() {
        colored::control::set_override(false);
        assert_eq!(check_mark(true, "(not found)"), "✓");
        assert_eq!(check_mark(false, "(not found)"), "(not found)");
    }
}
