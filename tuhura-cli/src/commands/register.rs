use anyhow::{Result, bail};
use clap::Args;
use client::{RegistrationForm, Route, RouteDecision};

use super::{prompt_or, prompt_secret_or, session::print_dashboard};
use crate::app::App;

/// Fields of the registration form. Missing ones are prompted for.
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Email address
    #[arg(long)]
    pub email: Option<String>,
    /// Username (3 to 50 characters)
    #[arg(long)]
    pub username: Option<String>,
    /// Password (at least 8 characters)
    #[arg(long)]
    pub password: Option<String>,
    /// Password confirmation
    #[arg(long)]
    pub confirm_password: Option<String>,
}

pub async fn register(app: &App, args: RegisterArgs) -> Result<()> {
    if let RouteDecision::Redirect(Route::Dashboard) = app.context.resolve_route(Route::Register) {
        println!("Already logged in.");
        return print_dashboard(app);
    }

    let form = RegistrationForm::new(
        prompt_or(args.email, "Email: ")?,
        prompt_or(args.username, "Username: ")?,
        prompt_secret_or(args.password, "Password: ")?,
        prompt_secret_or(args.confirm_password, "Confirm password: ")?,
    );

    match form.submit(&app.context).await {
        Ok(response) => {
            println!("{}", response.message);
            println!(
                "Registration successful. Log in with `tuhura login` ({}).",
                Route::Login
            );
            Ok(())
        }
        Err(errors) if errors.fields_valid() => {
            bail!("{errors}")
        }
        Err(errors) => {
            for (field, message) in errors.messages() {
                eprintln!("{field}: {message}");
            }
            bail!("please correct the fields above and try again")
        }
    }
}
