//! Opening the site and moving to the opinion listing.

use crate::browser::PageSession;
use crate::config::Settings;
use crate::error::Result;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Load the home page, dismiss the cookie banner if shown, then load the
/// listing page. Only page-load failures are returned.
#[instrument(level = "info", skip_all, fields(base_url = %settings.base_url))]
pub async fn open_listing<S: PageSession>(session: &mut S, settings: &Settings) -> Result<()> {
    if let Err(e) = session.goto(&settings.base_url).await {
        error!(error = %e, "Navigation error");
        return Err(e);
    }
    sleep(settings.settle()).await;

    accept_cookies(session, settings).await;

    let listing_url = settings.listing_url()?;
    if let Err(e) = session.goto(&listing_url).await {
        error!(error = %e, url = %listing_url, "Navigation error");
        return Err(e);
    }
    sleep(settings.settle()).await;
    info!(url = %listing_url, "Navigated to Opinion section");
    Ok(())
}

async fn accept_cookies<S: PageSession>(session: &mut S, settings: &Settings) {
    let selector = &settings.selectors.consent_button;
    match settings.wait().until_clickable(session, selector).await {
        Ok(Some(button)) => match session.click(&button).await {
            Ok(()) => {
                info!("Accepted cookies");
                sleep(settings.consent_settle()).await;
            }
            Err(e) => warn!(error = %e, "Could not click cookie consent button"),
        },
        Ok(None) => info!("No cookie consent needed"),
        Err(e) => warn!(error = %e, "Cookie consent check failed"),
    }
}
