use crate::auth::TokenStore;
use crate::cli::AuthCommand;
use crate::error::Result;
use colored::Colorize;

/// Handle auth commands
pub fn handle_auth(command: AuthCommand, explicit_token: Option<&str>) -> Result<()> {
    let store = TokenStore::default();

    match command {
        AuthCommand::Login { token } => {
            store.save(&token)?;
            println!("{}", "API token stored in the system keyring.".green());
        }
        AuthCommand::Logout => {
            if store.delete()? {
                println!("{}", "API token removed.".green());
            } else {
                println!("{}", "No stored API token found.".yellow());
            }
        }
        AuthCommand::Status => {
            // An explicit token shadows whatever the keyring holds
            if explicit_token.map(str::trim).is_some_and(|t| !t.is_empty()) {
                println!("Using token from {} or {}.", "--token".cyan(), "MEETLIST_TOKEN".cyan());
            } else if store.load()?.is_some() {
                println!("Using token stored in the system keyring.");
            } else {
                println!("{}", "No API token configured.".yellow());
                println!("Use {} to store one.", "meetlist auth login <TOKEN>".cyan());
            }
        }
    }

    Ok(())
}
