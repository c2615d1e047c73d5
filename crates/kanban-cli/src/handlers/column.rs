use super::track;
use crate::cli::{ColumnAction, ColumnUpdateArgs};
use crate::context::CliContext;
use crate::output;
use kanban_domain::ColumnPatch;

pub async fn handle(ctx: &mut CliContext, action: ColumnAction) -> anyhow::Result<()> {
    let notifier = ctx.notifier.as_ref();
    let wait = ctx.min_display;
    match action {
        ColumnAction::List => {
            let columns = track(
                notifier,
                wait,
                "Chargement des colonnes",
                "Colonnes chargées",
                ctx.columns.load(),
            )
            .await;
            output::output_list(output::or_exit(columns).to_vec());
        }
        ColumnAction::Get { id } => {
            let column = track(
                notifier,
                wait,
                "Chargement de la colonne",
                "Colonne chargée",
                ctx.columns.fetch(id),
            )
            .await;
            output::output_success(output::or_exit(column));
        }
        ColumnAction::Create { title } => {
            let column = track(
                notifier,
                wait,
                "Création de la colonne",
                "Colonne créée",
                ctx.columns.add(&title),
            )
            .await;
            output::output_success(output::or_exit(column));
        }
        ColumnAction::Update(args) => {
            let id = args.id;
            let patch = patch_from_args(args);
            if patch.is_empty() {
                output::output_error("Nothing to update: pass --name, --title or --description");
            }
            let column = track(
                notifier,
                wait,
                "Mise à jour de la colonne",
                "Colonne mise à jour",
                ctx.columns.update(id, &patch),
            )
            .await;
            output::output_success(output::or_exit(column));
        }
        ColumnAction::Delete { id } => {
            let deleted = track(
                notifier,
                wait,
                "Suppression de la colonne",
                "Colonne supprimée",
                ctx.columns.delete(id),
            )
            .await;
            output::or_exit(deleted);
            output::output_success(serde_json::json!({"deleted": id}));
        }
    }
    Ok(())
}

fn patch_from_args(args: ColumnUpdateArgs) -> ColumnPatch {
    ColumnPatch {
        name: args.name,
        title: args.title,
        description: args.description,
    }
}
