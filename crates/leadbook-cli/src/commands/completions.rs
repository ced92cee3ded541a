use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io::{self, Write};

const BIN_NAME: &str = "leadbook";

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// bash, zsh, fish, powershell or elvish
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn emit(args: CompletionsArgs) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_completions(args.shell, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Writes the completion script without opening config or the database.
fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = crate::Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_completions;
    use clap_complete::Shell;

    #[test]
    fn scripts_cover_nested_subcommands() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out).expect("bash");
        let script = String::from_utf8(out).expect("utf8");
        assert!(script.contains("leadbook"));
        assert!(script.contains("preview"));
        assert!(script.contains("log-message"));

        let mut out = Vec::new();
        write_completions(Shell::Fish, &mut out).expect("fish");
        assert!(String::from_utf8(out).expect("utf8").contains("import"));
    }
}
