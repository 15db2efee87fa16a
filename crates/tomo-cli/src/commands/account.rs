//! Account command handlers
//!
//! Local accounts share one machine's library between people. They are
//! not an access control mechanism: passwords live in plain text in the
//! local store.

use anyhow::{bail, Result};

use tomo_core::{AuthError, SessionManager};

use crate::output::Output;
use crate::AccountCommands;

pub fn handle(command: AccountCommands, session: &SessionManager, output: &Output) -> Result<()> {
    match command {
        AccountCommands::Register {
            name,
            email,
            password,
        } => register(session, &name, &email, &password, output),
        AccountCommands::Login { email, password } => login(session, &email, &password, output),
        AccountCommands::Logout => logout(session, output),
        AccountCommands::Show => show(session, output),
    }
}

/// Create an account, switch to it, and pull guest data across
fn register(
    session: &SessionManager,
    name: &str,
    email: &str,
    password: &str,
    output: &Output,
) -> Result<()> {
    let account = match session.register(name, email, password) {
        Ok(account) => account,
        Err(AuthError::DuplicateEmail) => bail!("An account with this email already exists."),
        Err(e) => return Err(e.into()),
    };

    let user = session.login(email, password)?;
    session.migrate_guest_data(&account.id)?;

    if output.is_json() {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else if output.is_quiet() {
        println!("{}", user.id);
    } else {
        println!("Welcome, {}!", user.name);
        println!();
        println!("Any books and words you added as a guest now belong to this account.");
        println!();
        println!("Note: accounts are a local convenience. The password is stored in");
        println!("plain text on this machine - do not reuse a real one.");
    }

    Ok(())
}

/// Log in to an existing account
fn login(session: &SessionManager, email: &str, password: &str, output: &Output) -> Result<()> {
    let user = match session.login(email, password) {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => bail!("Email or password is incorrect."),
        Err(e) => return Err(e.into()),
    };

    if output.is_json() {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else if output.is_quiet() {
        println!("{}", user.id);
    } else {
        println!("Welcome back, {}!", user.name);
    }

    Ok(())
}

/// Log out, returning to the guest library
fn logout(session: &SessionManager, output: &Output) -> Result<()> {
    session.logout()?;
    output.success("Logged out. Back to the guest library.");
    Ok(())
}

/// Show the active account
fn show(session: &SessionManager, output: &Output) -> Result<()> {
    match session.active_user() {
        Some(user) => {
            if output.is_json() {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else if output.is_quiet() {
                println!("{}", user.id);
            } else {
                println!("Logged in as: {} <{}>", user.name, user.email);
            }
        }
        None => {
            if output.is_json() {
                println!("null");
            } else if !output.is_quiet() {
                println!("Not logged in (guest library).");
            }
        }
    }
    Ok(())
}
