use anyhow::{Result, bail};
use clap::Args;
use client::{Route, RouteDecision};

use super::{prompt_or, prompt_secret_or};
use crate::app::App;

const SESSION_TYPE: &str = "JWT Bearer Token";

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Email address
    #[arg(long)]
    pub email: Option<String>,
    /// Password (prompted for without echo when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

pub async fn login(app: &mut App, args: LoginArgs) -> Result<()> {
    if let RouteDecision::Redirect(Route::Dashboard) = app.context.resolve_route(Route::Login) {
        println!("Already logged in.");
        return print_dashboard(app);
    }

    let email = prompt_or(args.email, "Email: ")?;
    let password = prompt_secret_or(args.password, "Password: ")?;

    app.context.login(&email, &password).await?;
    print_dashboard(app)
}

pub fn logout(app: &mut App) {
    let was_authenticated = app.context.is_authenticated();
    app.context.logout();
    if was_authenticated {
        println!("Logged out.");
    } else {
        println!("No active session.");
    }
}

pub fn dashboard(app: &App) -> Result<()> {
    print_dashboard(app)
}

/// Renders the gated dashboard, or fails with a pointer to the login route.
pub fn print_dashboard(app: &App) -> Result<()> {
    match app.context.resolve_route(Route::Dashboard) {
        RouteDecision::Render(_) => {}
        RouteDecision::Redirect(route) => {
            bail!("not logged in; run `tuhura login` first ({route})")
        }
        RouteDecision::Pending => bail!("session is still loading"),
    }

    let Some(user) = app.context.user() else {
        bail!("not logged in; run `tuhura login` first ({})", Route::Login)
    };

    println!("Welcome, {}!", user.email);
    println!();
    println!("  User ID:  {}", user.id);
    println!("  Email:    {}", user.email);
    println!("  Roles:    {}", user.roles_display());
    println!("  Session:  {SESSION_TYPE}");
    Ok(())
}
