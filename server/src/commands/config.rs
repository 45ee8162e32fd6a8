use crate::{
    state::{SessionConfig, UpstreamConfig},
    AppConfig, Result,
};

pub(crate) fn print_config() -> Result<()> {
    let app = AppConfig::from_env()?;
    let upstream = UpstreamConfig::from_env()?;
    let sessions = SessionConfig::from_env()?;

    println!("Listening port:      {}", app.port);
    println!("App base URL:        {}", app.base_url);
    println!("Proxy endpoint:      {}", app.app_url("/api/recipes"));
    match &upstream.recipe_api_url {
        Some(url) => println!("Recipe API:          {url}"),
        None => println!("Recipe API:          (not configured, searches will fail)"),
    }
    println!(
        "Session idle TTL:    {} minutes",
        sessions.idle_ttl.num_minutes()
    );
    println!(
        "Cookie key:          {}",
        if std::env::var("COOKIE_KEY").is_ok() {
            "from COOKIE_KEY"
        } else {
            "generated at startup"
        }
    );

    Ok(())
}
