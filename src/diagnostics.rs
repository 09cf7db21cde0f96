use crate::config::CONFIG_FILE;
use crate::error::Error;

/// ANSI bold, used for markdown headings on a terminal.
const BOLD: &str = "\x1b[1m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::NoActiveDocument => render_no_active_document(),
        Error::DocumentOutsideVault { path, vault } => {
            render_document_outside_vault(&path.display().to_string(), &vault.display().to_string())
        },
        Error::VaultNotFound { path } => render_vault_not_found(&path.display().to_string()),
        Error::TomlDe(inner) => render_invalid_config(&inner.to_string()),
        Error::DestinationExists { .. } | Error::Io(_) | Error::Json(_) | Error::NotInVault { .. } => {
            render_generic(e)
        },
    };
}

/// Fallback block for errors without a dedicated fix.
fn render_generic(e: &Error) -> String {
    return format!(
        "\
# Error

{e}
"
    );
}

/// Block for a config file that does not parse.
fn render_invalid_config(reason: &str) -> String {
    return format!(
        "\
# Error: Invalid Config

`{CONFIG_FILE}` could not be parsed: {reason}

## Fix

Supported keys:

    exclude = [\"assets/logos/\"]       # never rename under these prefixes
    ignore_extensions = [\"md\"]        # never rename these file types
    keep_display_text = false         # keep alias / alt text on rewrite
"
    );
}

/// Block for a missing note.
fn render_no_active_document() -> String {
    return "\
# Error: No Active Document

The note does not exist or is not a regular file. Nothing was read or renamed.

## Fix

Pass the path of a markdown note inside the vault:

    hashattach rename Notes/today.md
"
    .to_string();
}

/// Block for a note that lives outside the vault.
fn render_document_outside_vault(path: &str, vault: &str) -> String {
    return format!(
        "\
# Error: Document Outside Vault

`{path}` is not inside the vault `{vault}`.

## Fix

Point `--vault` at a directory that contains the note.
"
    );
}

/// Block for a vault root that is not a directory.
fn render_vault_not_found(path: &str) -> String {
    return format!(
        "\
# Error: Vault Not Found

`{path}` is not a directory.
"
    );
}
