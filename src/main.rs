mod app;
mod catalog;
mod clipboard;
mod config;
mod devices;
mod explorer;
mod form;
mod http;
mod request;
mod snippet;
mod storage;
mod ui;

use anyhow::Result;
use app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut app = App::new().map_err(anyhow::Error::msg)?;
    app.run().await
}
