use std::io::IsTerminal;

use anyhow::{Context, Result, anyhow, bail};
use dialoguer::Password;
use schoolbase_core::{NewUser, UserRole};
use schoolbase_runtime_config::{ConfigError, resolve_secret};

use crate::runtime::Runtime;

pub struct CreateUser {
    pub email: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub school_email: Option<String>,
    pub phone: Option<String>,
    pub password_env: String,
    pub password_file: Option<String>,
}

pub fn run_create_user(rt: &Runtime, args: CreateUser) -> Result<()> {
    let db = rt.open_migrated()?;

    let school_id = match (&args.school_email, args.role.requires_school()) {
        (Some(email), true) => {
            let school = db
                .get_school_by_email(email)?
                .ok_or_else(|| anyhow!("No school with email {email}"))?;
            Some(school.id)
        }
        (None, true) => bail!("--school-email is required for role {}", args.role),
        (Some(_), false) => bail!("{} accounts do not belong to a school", args.role),
        (None, false) => None,
    };

    let password = read_password(&args)?;
    let user = db
        .create_user(
            &NewUser {
                email: args.email.clone(),
                first_name: args.first_name,
                last_name: args.last_name,
                phone: args.phone,
                role: args.role,
                school_id,
            },
            &password,
        )
        .with_context(|| format!("Failed to create user {}", args.email))?;
    println!("Created {} {} ({})", user.role, user.email, user.id);
    Ok(())
}

/// Env var or file first; an interactive terminal may type it instead.
fn read_password(args: &CreateUser) -> Result<String> {
    match resolve_secret(&args.password_env, args.password_file.as_deref(), |name| {
        std::env::var(name).ok()
    }) {
        Ok(password) => Ok(password),
        Err(ConfigError::MissingSecret { .. }) if std::io::stdin().is_terminal() => {
            Password::new()
                .with_prompt(format!("Password for {}", args.email))
                .with_confirmation("Repeat password", "Passwords do not match")
                .interact()
                .context("Failed to read password")
        }
        Err(err) => Err(err).context("User password is not available"),
    }
}
