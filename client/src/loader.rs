use footprint_shared::{DataConfig, LoadError, MapData};

/// Fetch a response body as raw bytes.
async fn fetch_bytes(url: &str) -> Result<Vec<u8>, LoadError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| LoadError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !resp.ok() {
        return Err(LoadError::Http {
            url: url.to_string(),
            status: resp.status(),
        });
    }

    resp.binary().await.map_err(|e| LoadError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Fetch both topologies concurrently. Either failure fails the whole load.
pub async fn load_map_data(data: &DataConfig) -> Result<MapData, LoadError> {
    let (land, countries) = futures::try_join!(
        fetch_bytes(&data.land_url),
        fetch_bytes(&data.countries_url)
    )?;
    MapData::decode(&land, &countries, data)
}
