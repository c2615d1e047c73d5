use super::track;
use crate::context::CliContext;
use crate::output;

pub async fn handle_ping(ctx: &CliContext) -> anyhow::Result<()> {
    let status = track(
        ctx.notifier.as_ref(),
        ctx.min_display,
        "Connexion à WordPress",
        "Connexion WordPress OK",
        ctx.client.test_connection(),
    )
    .await;
    let status = output::or_exit(status);
    output::output_success(serde_json::json!({
        "message": status.message,
        "url": ctx.client.api_url(),
    }));
    Ok(())
}

pub async fn handle_info(ctx: &CliContext) -> anyhow::Result<()> {
    let info = track(
        ctx.notifier.as_ref(),
        ctx.min_display,
        "Lecture de l'index de l'API",
        "Informations de l'API récupérées",
        ctx.client.api_info(),
    )
    .await;
    output::output_success(output::or_exit(info));
    Ok(())
}
