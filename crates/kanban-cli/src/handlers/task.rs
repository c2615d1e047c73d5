use super::track;
use crate::cli::{TaskAction, TaskCreateArgs, TaskUpdateArgs};
use crate::context::CliContext;
use crate::output;
use kanban_domain::{FieldUpdate, NewTask, TaskMeta, TaskPatch, TASK_STATUS_KEY};

pub async fn handle(ctx: &mut CliContext, action: TaskAction) -> anyhow::Result<()> {
    let notifier = ctx.notifier.as_ref();
    let wait = ctx.min_display;
    match action {
        TaskAction::List { column } => {
            let tasks = track(
                notifier,
                wait,
                "Chargement des tâches",
                "Tâches chargées",
                ctx.tasks.load(column),
            )
            .await;
            output::output_list(output::or_exit(tasks).to_vec());
        }
        TaskAction::Get { id } => {
            let task = track(
                notifier,
                wait,
                "Chargement de la tâche",
                "Tâche chargée",
                ctx.tasks.fetch(id),
            )
            .await;
            output::output_success(output::or_exit(task));
        }
        TaskAction::Create(args) => {
            let new_task = new_task_from_args(args);
            let task = track(
                notifier,
                wait,
                "Création de la tâche",
                "Tâche créée",
                ctx.tasks.add(&new_task),
            )
            .await;
            output::output_success(output::or_exit(task));
        }
        TaskAction::Update(args) => {
            let id = args.id;
            let patch = patch_from_args(args);
            if patch.is_empty() {
                output::output_error("Nothing to update: pass at least one field to change");
            }
            let task = track(
                notifier,
                wait,
                "Mise à jour de la tâche",
                "Tâche mise à jour",
                ctx.tasks.update(id, &patch),
            )
            .await;
            output::output_success(output::or_exit(task));
        }
        TaskAction::Move { id, column } => {
            let task = track(
                notifier,
                wait,
                "Déplacement de la tâche",
                "Tâche déplacée",
                ctx.tasks.move_task(id, column),
            )
            .await;
            output::output_success(output::or_exit(task));
        }
        TaskAction::Delete { id } => {
            let deleted = track(
                notifier,
                wait,
                "Suppression de la tâche",
                "Tâche supprimée",
                ctx.tasks.delete(id),
            )
            .await;
            output::or_exit(deleted);
            output::output_success(serde_json::json!({"deleted": id}));
        }
    }
    Ok(())
}

fn new_task_from_args(args: TaskCreateArgs) -> NewTask {
    let mut task = NewTask {
        title: args.title,
        content: args.content,
        excerpt: args.excerpt,
        category_id: args.column,
        status: args.post_status,
        meta: TaskMeta::new(),
    };
    if let Some(status) = args.status {
        task = task.with_task_status(status);
    }
    task
}

fn patch_from_args(args: TaskUpdateArgs) -> TaskPatch {
    let category_id = match (args.column, args.no_column) {
        (Some(column), _) => FieldUpdate::Set(column),
        (None, true) => FieldUpdate::Clear,
        (None, false) => FieldUpdate::NoChange,
    };
    let meta = args.status.map(|status| {
        let mut meta = TaskMeta::new();
        meta.insert(TASK_STATUS_KEY.to_string(), status);
        meta
    });
    TaskPatch {
        title: args.title,
        content: args.content,
        excerpt: args.excerpt,
        category_id,
        status: args.post_status,
        meta,
    }
}
