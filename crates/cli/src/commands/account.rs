//! `shopfront login | register | logout | whoami`

use shopfront_storefront::{Action, Store};

use super::CommandResult;
use crate::output;

pub async fn login(store: &Store, email: &str, password: &str) -> CommandResult {
    store.login(email, password).await?;
    whoami(store).await
}

pub async fn register(
    store: &Store,
    email: &str,
    password: &str,
    name: &str,
    phone: &str,
) -> CommandResult {
    store.register(email, password, name, phone).await?;
    output::status("Account created. Sign in with `shopfront login`.");
    Ok(())
}

pub async fn logout(store: &Store) -> CommandResult {
    store.dispatch(Action::Logout).await;
    output::status("Signed out");
    Ok(())
}

pub async fn whoami(store: &Store) -> CommandResult {
    let state = store.state().await;
    if state.user.is_logged_in {
        output::emit(&state.user.profile)?;
    } else {
        output::status("Not signed in");
    }
    Ok(())
}
