use clap::Subcommand;
use focus_tracker_core::auth::validate_signup;

use super::{AppContext, CmdResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account and log in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Repeat of the password (defaults to --password)
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        name: String,
    },
    /// Log in to an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the current user
    Logout,
    /// Print the current user as JSON (`null` when logged out)
    Whoami,
}

pub async fn run(action: AuthAction) -> CmdResult {
    let ctx = AppContext::open()?;
    let accounts = ctx.accounts();

    match action {
        AuthAction::Signup {
            email,
            password,
            confirm_password,
            name,
        } => {
            let confirm = confirm_password.as_deref().unwrap_or(&password);
            validate_signup(&email, &password, confirm, &name)?;
            let user = accounts.signup(&email, &password, &name).await?;
            eprintln!("Account created successfully! Logged in as {}.", user.name);
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        AuthAction::Login { email, password } => {
            let user = accounts.login(&email, &password).await?;
            eprintln!("Welcome back, {}!", first_name(&user.name));
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        AuthAction::Logout => {
            accounts.logout()?;
            println!("logged out");
        }
        AuthAction::Whoami => {
            let user = accounts.current_user()?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }
    Ok(())
}

fn first_name(name: &str) -> &str {
    name.split(' ').next().unwrap_or(name)
}
