//! `recommend` subcommand: one orchestrated request per placement.

use futures::future::join_all;
use storefront_campaign::{
    CampaignOrchestrator, CampaignRequest, HttpRecommendationClient, ResponseMode,
};
use storefront_core::AppConfig;

pub(crate) async fn run(
    config: &AppConfig,
    placements: &[String],
    mode: ResponseMode,
    product: Option<&str>,
    variant: Option<&str>,
) -> anyhow::Result<()> {
    let client = HttpRecommendationClient::new(
        &config.recs_url,
        &config.account_id,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let orchestrator = CampaignOrchestrator::with_batch_delay(client, config.batch_delay());

    let requests = placements.iter().map(|placement| {
        let mut request = CampaignRequest::new(placement.clone(), mode);
        request.product_id = product.map(str::to_owned);
        request.variant_id = variant.map(str::to_owned);
        orchestrator.add_request(request)
    });
    let results = join_all(requests.collect::<Vec<_>>()).await;

    let mut failed = 0usize;
    for (placement, result) in placements.iter().zip(results) {
        match result {
            Ok(Some(payload)) => {
                println!("{placement}: {}", serde_json::to_string(&payload)?);
            }
            Ok(None) => println!("{placement}: <empty>"),
            Err(e) => {
                tracing::error!(placement = %placement, error = %e, "placement failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} placements failed", placements.len());
    }
    Ok(())
}
