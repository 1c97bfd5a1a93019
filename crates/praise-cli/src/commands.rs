use std::io::Write;

use anyhow::{Context, bail};
use tracing::{debug, info};

use praise_app::dashboard::PraiseSlide;
use praise_app::rewards::RewardsScreen;
use praise_app::{
    BannerKind, DashboardScreen, DashboardView, GivePraiseView, Guarded, LoginMode, LoginView,
    Route, RewardsView, guard,
};
use praise_client::Session;

use crate::config::{Cli, Command, Config, Credentials};

/// Run one subcommand, writing its output to `out`.
pub async fn run(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = cli.config;
    debug!("Using backend {}", config.api_url);

    match cli.command {
        Command::Login(credentials) => login(&config, None, credentials, out).await,
        Command::Register {
            first_name,
            last_name,
            credentials,
        } => login(&config, Some((first_name, last_name)), credentials, out).await,
        Command::Logout => {
            config.session().remove_token()?;
            writeln!(out, "Logged out")?;
            Ok(())
        }
        Command::Feed { rounds } => feed(&config, rounds, out).await,
        Command::Give { to, value, message } => give(&config, to, value, message, out).await,
        Command::Recipients => recipients(&config, out).await,
        Command::Rewards => rewards(&config, None, out).await,
        Command::Redeem { reward_id } => rewards(&config, Some(reward_id), out).await,
        Command::Whoami => whoami(&config, out).await,
    }
}

/// Fail unless `route` may be shown with the stored session.
fn enter(session: &Session, route: Route) -> anyhow::Result<()> {
    match guard(session, route) {
        Guarded::Render(_) => Ok(()),
        Guarded::Redirect(to) => bail!("{route} redirects to {to}: run `praise login` first"),
    }
}

/// Turn a navigation requested by a view into an error for the shell.
fn follow(route: Option<Route>) -> anyhow::Result<()> {
    match route {
        Some(Route::Login) => bail!("session rejected by the backend: run `praise login` again"),
        _ => Ok(()),
    }
}

async fn login(
    config: &Config,
    names: Option<(String, String)>,
    credentials: Credentials,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut view = LoginView::new(config.client()?);
    if let Some((first_name, last_name)) = names {
        view.toggle_mode();
        let form = view.form_mut();
        form.first_name = first_name;
        form.last_name = last_name;
    }
    let form = view.form_mut();
    form.email = credentials.email;
    form.password = credentials.password;

    match view.submit().await {
        Some(route) => {
            let verb = match view.mode() {
                LoginMode::Login => "Logged in",
                LoginMode::Register => "Registered and logged in",
            };
            writeln!(out, "{verb}. Next: {route}")?;
            Ok(())
        }
        None => bail!("{}", view.error().unwrap_or("login failed")),
    }
}

fn print_slide(out: &mut dyn Write, slide: &PraiseSlide) -> std::io::Result<()> {
    let dots: String = slide
        .dots
        .iter()
        .map(|on| if *on { '●' } else { '○' })
        .collect();
    writeln!(out, "[{}] {}", slide.core_value, slide.message)?;
    writeln!(out, "  {} -> {}  {}", slide.from, slide.to, slide.points)?;
    writeln!(out, "  {dots}  {}", slide.counter)
}

async fn feed(config: &Config, rounds: usize, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = config.client()?;
    enter(client.session(), Route::Dashboard)?;

    let mut view = DashboardView::new(client);
    follow(view.mount().await)?;

    match view.render() {
        DashboardScreen::Showing(slide) => print_slide(out, &slide)?,
        DashboardScreen::Empty { message } => {
            writeln!(out, "{message}")?;
            return Ok(());
        }
        DashboardScreen::Failed { message } => bail!(message),
        DashboardScreen::Loading => return Ok(()),
    }

    for _ in 0..rounds {
        if !view.next_rotation().await {
            break;
        }
        writeln!(out)?;
        if let DashboardScreen::Showing(slide) = view.render() {
            print_slide(out, &slide)?;
        }
    }
    view.unmount();
    Ok(())
}

async fn give(
    config: &Config,
    to: String,
    value: String,
    message: String,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let client = config.client()?;
    enter(client.session(), Route::GivePraise)?;

    let mut view = GivePraiseView::new(client);
    let form = view.form_mut();
    form.receiver_id = to;
    form.core_value_id = value;
    form.message = message;

    match view.submit().await {
        Some(redirect) if redirect.route() == Route::Login => follow(Some(Route::Login)),
        Some(redirect) => {
            if let Some(success) = view.render().success {
                writeln!(out, "{success}")?;
            }
            let next = redirect.wait().await;
            info!("Redirected to {}", next);
            feed(config, 0, out).await
        }
        None => bail!("{}", view.error().unwrap_or("Failed to give praise")),
    }
}

async fn recipients(config: &Config, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = config.client()?;
    enter(client.session(), Route::GivePraise)?;

    let mut view = GivePraiseView::new(client);
    follow(view.mount().await)?;
    if let Some(error) = view.error() {
        bail!("{error}");
    }

    let screen = view.render();
    writeln!(out, "People:")?;
    for choice in &screen.recipients {
        writeln!(out, "  {:>4}  {}", choice.value, choice.label)?;
    }
    writeln!(out, "Core values:")?;
    for choice in &screen.core_values {
        writeln!(out, "  {:>4}  {}", choice.value, choice.label)?;
    }
    Ok(())
}

async fn rewards(config: &Config, redeem: Option<i64>, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = config.client()?;
    enter(client.session(), Route::Rewards)?;

    let mut view = RewardsView::new(client);
    follow(view.mount().await)?;
    if let Some(reward_id) = redeem {
        follow(view.redeem(reward_id).await)?;
    }

    let page = match view.render() {
        RewardsScreen::Ready(page) => page,
        RewardsScreen::Failed { message } => bail!(message),
        RewardsScreen::Loading => return Ok(()),
    };

    writeln!(out, "{}", page.balance)?;
    if let Some((BannerKind::Success, text)) = &page.banner {
        writeln!(out, "{text}")?;
    }

    writeln!(out)?;
    match page.rewards_empty {
        Some(empty) => writeln!(out, "{empty}")?,
        None => {
            for card in &page.rewards {
                writeln!(
                    out,
                    "  {:>4}  {:<24} {:>12}  [{}]",
                    card.id, card.name, card.cost, card.button
                )?;
                if let Some(description) = &card.description {
                    writeln!(out, "        {description}")?;
                }
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", page.redemptions_heading)?;
    match page.redemptions_empty {
        Some(empty) => writeln!(out, "  {empty}")?,
        None => {
            for line in &page.redemptions {
                writeln!(
                    out,
                    "  {}  {:<24} {:>12}  {}",
                    line.date, line.name, line.points, line.status
                )?;
            }
        }
    }

    if let Some((BannerKind::Error, text)) = page.banner {
        bail!(text);
    }
    Ok(())
}

async fn whoami(config: &Config, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = config.client()?;
    enter(client.session(), Route::Dashboard)?;

    let user = match client.current_user().await {
        Ok(user) => user,
        Err(e) if e.is_auth() => {
            client.session().remove_token()?;
            return follow(Some(Route::Login));
        }
        Err(e) => return Err(e).context("could not load the current user"),
    };
    writeln!(out, "{} <{}>", user.full_name(), user.email)?;
    writeln!(out, "{} points", user.points_balance)?;
    Ok(())
}
