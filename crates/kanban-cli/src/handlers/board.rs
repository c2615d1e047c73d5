use super::track;
use crate::cli::BoardAction;
use crate::context::CliContext;
use crate::output;
use kanban_domain::template::starter_board;
use kanban_domain::{slugify, ColumnPatch, NewTask};
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
struct SeedReport {
    columns_created: Vec<String>,
    columns_existing: Vec<String>,
    tasks_created: usize,
}

pub async fn handle(ctx: &mut CliContext, action: BoardAction) -> anyhow::Result<()> {
    match action {
        BoardAction::Show { cached: true } => {
            output::output_success(ctx.board.board());
        }
        BoardAction::Show { cached: false } => {
            let board = track(
                ctx.notifier.as_ref(),
                ctx.min_display,
                "Chargement du tableau",
                "Tableau chargé",
                ctx.board.load(),
            )
            .await;
            output::output_success(output::or_exit(board));
        }
        BoardAction::Seed => {
            let report = seed(ctx).await;
            output::output_success(report);
        }
    }
    Ok(())
}

/// Create every starter column that is missing, matched by slug, and fill
/// each new one with its sample tasks. Existing columns are left alone.
async fn seed(ctx: &mut CliContext) -> SeedReport {
    let notifier = ctx.notifier.as_ref();
    let wait = ctx.min_display;

    let existing = track(
        notifier,
        wait,
        "Chargement des colonnes",
        "Colonnes chargées",
        ctx.columns.load(),
    )
    .await;
    let existing: Vec<String> = output::or_exit(existing)
        .iter()
        .map(|c| c.name.clone())
        .collect();

    let mut report = SeedReport::default();
    for template in starter_board() {
        let already_there = existing
            .iter()
            .any(|name| name == template.name || *name == slugify(template.title));
        if already_there {
            report.columns_existing.push(template.name.to_string());
            continue;
        }

        let created = output::or_exit(ctx.columns.add(template.title).await);
        let rename = ColumnPatch {
            name: Some(template.name.to_string()),
            ..ColumnPatch::default()
        };
        let column = output::or_exit(ctx.columns.update(created.id, &rename).await);
        tracing::info!("Seeded column {} ({})", column.name, column.id);
        report.columns_created.push(column.name.clone());

        for title in template.tasks {
            output::or_exit(ctx.tasks.add(&NewTask::new(*title).in_column(column.id)).await);
            report.tasks_created += 1;
        }
    }

    notifier.notify_success(
        &format!(
            "{} colonne(s) et {} tâche(s) créées",
            report.columns_created.len(),
            report.tasks_created
        ),
        Some("Tableau initialisé"),
    );
    report
}
