use std::error::Error;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::cli::commands::RemoteArgs;
use crate::model::config::RemoteConfig;
use crate::sync::drive::{BLOB_NAME, CloudStore, DriveClient, Upload};
use crate::sync::http::{Credentials, HttpStore};
use crate::sync::{self, RemoteStore, SyncError, SyncOutcome, oauth};

use super::Context;

/// URL placeholder meaning "use [remote].url from the config"
const CONFIG_URL: &str = "-";

/// Credentials on the command line win over the config file
fn credentials(args: &RemoteArgs, config: &RemoteConfig) -> Credentials {
    match &args.user {
        Some(user) => Credentials::new(user.as_str(), args.pass.clone().unwrap_or_default()),
        None => Credentials::new(config.username.as_str(), config.password.as_str()),
    }
}

fn resolve_url(args: &RemoteArgs, config: &RemoteConfig) -> Option<String> {
    if args.url == CONFIG_URL {
        config.url.clone()
    } else {
        Some(args.url.clone())
    }
}

fn http_store(ctx: &Context, args: &RemoteArgs) -> Option<HttpStore> {
    let remote = &ctx.config.remote;
    let Some(url) = resolve_url(args, remote) else {
        ctx.out
            .error("No server URL configured. Pass one, or set [remote].url in the config file");
        return None;
    };
    let timeout = Duration::from_secs(remote.timeout_secs);
    match HttpStore::new(&url, credentials(args, remote), timeout) {
        Ok(store) => Some(store),
        Err(e) => {
            ctx.out.error(&format!("Error creating request: {}", e));
            None
        }
    }
}

/// Print a remote failure. A failed local write still propagates.
fn report(ctx: &Context, prefix: &str, err: SyncError) -> Result<(), Box<dyn Error>> {
    match err {
        SyncError::Store(e) => Err(Box::new(e)),
        other => {
            ctx.out.error(&format!("{}: {}", prefix, other));
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP endpoint
// ---------------------------------------------------------------------------

pub fn cmd_save(ctx: &mut Context, args: &RemoteArgs) -> Result<(), Box<dyn Error>> {
    let Some(store) = http_store(ctx, args) else {
        return Ok(());
    };
    match sync::push(&ctx.repo, &store) {
        Ok(n) => {
            ctx.out
                .success(&format!("Successfully saved {} todos to {}", n, store.describe()));
            Ok(())
        }
        Err(e) => report(ctx, "Error saving todos", e),
    }
}

pub fn cmd_load(ctx: &mut Context, args: &RemoteArgs) -> Result<(), Box<dyn Error>> {
    let Some(store) = http_store(ctx, args) else {
        return Ok(());
    };
    match sync::pull(&mut ctx.repo, &store) {
        Ok(n) => {
            ctx.out
                .success(&format!("Successfully loaded {} todos from {}", n, store.describe()));
            Ok(())
        }
        Err(e) => report(ctx, "Error loading todos", e),
    }
}

pub fn cmd_sync(ctx: &mut Context, args: &RemoteArgs) -> Result<(), Box<dyn Error>> {
    let Some(store) = http_store(ctx, args) else {
        return Ok(());
    };
    ctx.out.progress("Syncing with network...");
    match sync::sync(&mut ctx.repo, &store) {
        Ok(SyncOutcome::Merged(merge)) => {
            if merge.remote_only > 0 {
                ctx.out
                    .info(&format!("{} new todos from the server", merge.remote_only));
            }
            ctx.out.success(&format!(
                "Successfully synced {} todos with {}",
                ctx.repo.list().len(),
                store.describe()
            ));
            Ok(())
        }
        Ok(SyncOutcome::PushedOnly {
            fetch_error,
            pushed,
        }) => {
            ctx.out
                .error(&format!("Error loading from network: {}", fetch_error));
            ctx.out.info("Saving local todos to network instead...");
            ctx.out
                .success(&format!("Successfully saved {} todos to {}", pushed, store.describe()));
            Ok(())
        }
        Err(e) => report(ctx, "Error syncing todos", e),
    }
}

// ---------------------------------------------------------------------------
// Google Drive
// ---------------------------------------------------------------------------

/// Show the consent URL and read the pasted code from stdin
fn prompt_for_code(url: &str) -> io::Result<String> {
    println!("Go to the following link in your browser then type the authorization code:");
    println!("{}", url);
    print!("> ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin().lock().read_line(&mut code)?;
    Ok(code)
}

fn drive_store(ctx: &Context) -> Result<CloudStore<DriveClient>, SyncError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(ctx.config.remote.timeout_secs))
        .build()?;
    let token = oauth::access_token(&client, &ctx.config.drive, &mut prompt_for_code)?;
    Ok(CloudStore::new(DriveClient::new(client, token)))
}

pub fn cmd_upload(ctx: &mut Context) -> Result<(), Box<dyn Error>> {
    ctx.out.progress("Uploading todos to Google Drive...");
    let result = drive_store(ctx).and_then(|cloud| cloud.upload(ctx.repo.list()));
    match result {
        Ok(Upload::Created(id)) => {
            ctx.out.success(&format!(
                "Created file '{}' in Google Drive (ID: {})",
                BLOB_NAME, id
            ));
            Ok(())
        }
        Ok(Upload::Updated(id)) => {
            ctx.out.success(&format!(
                "Updated file '{}' in Google Drive (ID: {})",
                BLOB_NAME, id
            ));
            Ok(())
        }
        Err(e) => report(ctx, "Upload failed", e),
    }
}

pub fn cmd_download(ctx: &mut Context) -> Result<(), Box<dyn Error>> {
    ctx.out.progress("Downloading todos from Google Drive...");
    let cloud = match drive_store(ctx) {
        Ok(cloud) => cloud,
        Err(e) => return report(ctx, "Download failed", e),
    };
    match sync::pull(&mut ctx.repo, &cloud) {
        Ok(n) => {
            ctx.out
                .success(&format!("Downloaded and saved {} todos from Google Drive", n));
            Ok(())
        }
        Err(SyncError::NotFound(_)) => {
            ctx.out
                .warning(&format!("File '{}' not found in Google Drive", BLOB_NAME));
            Ok(())
        }
        Err(e) => report(ctx, "Download failed", e),
    }
}
