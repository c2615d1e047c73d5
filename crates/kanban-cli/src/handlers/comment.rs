use super::track;
use crate::cli::CommentAction;
use crate::context::CliContext;
use crate::output;
use kanban_domain::{CommentPatch, NewComment};

pub async fn handle(ctx: &mut CliContext, action: CommentAction) -> anyhow::Result<()> {
    let notifier = ctx.notifier.as_ref();
    let wait = ctx.min_display;
    match action {
        CommentAction::List { task } => {
            let comments = track(
                notifier,
                wait,
                "Chargement des commentaires",
                "Commentaires chargés",
                ctx.comments.load(task),
            )
            .await;
            output::output_list(output::or_exit(comments).to_vec());
        }
        CommentAction::Create {
            task,
            content,
            author,
            email,
        } => {
            let new_comment = NewComment {
                content,
                author,
                email,
            };
            let comment = track(
                notifier,
                wait,
                "Envoi du commentaire",
                "Commentaire ajouté",
                ctx.comments.add(task, &new_comment),
            )
            .await;
            output::output_success(output::or_exit(comment));
        }
        CommentAction::Update { id, content } => {
            let patch = CommentPatch {
                content: Some(content),
            };
            let comment = track(
                notifier,
                wait,
                "Mise à jour du commentaire",
                "Commentaire mis à jour",
                ctx.comments.update(id, &patch),
            )
            .await;
            output::output_success(output::or_exit(comment));
        }
        CommentAction::Delete { id } => {
            let deleted = track(
                notifier,
                wait,
                "Suppression du commentaire",
                "Commentaire supprimé",
                ctx.comments.delete(id),
            )
            .await;
            output::or_exit(deleted);
            output::output_success(serde_json::json!({"deleted": id}));
        }
    }
    Ok(())
}
