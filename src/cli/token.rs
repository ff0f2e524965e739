use serde_json::json;

use crate::{
    cli::{Providers, print_json, with_spinner},
    error,
    management::Credential,
    success,
};

pub async fn token_app(providers: &Providers) {
    match with_spinner("Requesting app token...", providers.app.get_token()).await {
        Ok(_) => {
            success!("App token obtained");
            print_credential(&providers.app.credential().await);
        }
        Err(e) => error!("Cannot obtain app token. Err: {}", e),
    }
}

pub async fn token_user(providers: &Providers) {
    match with_spinner("Authorizing user...", providers.user.get_token()).await {
        Ok(_) => {
            success!("User token obtained");
            print_credential(&providers.user.credential().await);
        }
        Err(e) => match e.step() {
            Some(step) => error!("User authorization failed at {}. Err: {}", step, e),
            None => error!("Cannot obtain user token. Err: {}", e),
        },
    }
}

fn print_credential(credential: &Credential) {
    print_json(&json!({
        "access_token": credential.token(),
        "expires_at": credential.expires_at().map(|t| t.to_rfc3339()),
    }));
}
