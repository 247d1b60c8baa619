use std::env;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub bus_type: String,
    pub nats_url: String,
    pub store_type: String,
    pub database_url: Option<String>,
    pub tax_price: f64,
    pub shipping_price: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8104".to_string())
            .parse()
            .map_err(|_| "PORT must be a valid u16".to_string())?;

        let bus_type = env::var("BUS_TYPE").unwrap_or_else(|_| "inmemory".to_string());

        let nats_url =
            env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let store_type = env::var("STORE_TYPE").unwrap_or_else(|_| "memory".to_string());

        let database_url = env::var("DATABASE_URL").ok();
        if store_type == "postgres" && database_url.is_none() {
            return Err("DATABASE_URL must be set when STORE_TYPE=postgres".to_string());
        }

        let tax_price: f64 = env::var("TAX_PRICE")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|_| "TAX_PRICE must be a number".to_string())?;

        let shipping_price: f64 = env::var("SHIPPING_PRICE")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .map_err(|_| "SHIPPING_PRICE must be a number".to_string())?;

        Ok(Config {
            host,
            port,
            bus_type,
            nats_url,
            store_type,
            database_url,
            tax_price,
            shipping_price,
        })
    }
}
