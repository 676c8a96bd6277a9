use anyhow::Result;
use keygate::api::openapi;

/// Print the OpenAPI spec so CI can publish it without starting the server.
fn main() -> Result<()> {
    println!("{}", openapi().to_pretty_json()?);
    Ok(())
}
