//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use eyre::WrapErr;
use hireflow::task::{ports::Record, services::CreateTaskRequest};
use rstest_bdd_macros::given;
use serde_json::{Value, json};

#[given(r#"staff member "{id}" named "{name}""#)]
fn staff_member(world: &mut TaskLifecycleWorld, id: String, name: String) -> Result<(), eyre::Report> {
    let Value::Object(fields) = json!({ "Name": name, "Is Admin": false }) else {
        return Err(eyre::eyre!("staff fields must be an object"));
    };
    world
        .repository
        .seed("Staff", Record::new(id, fields))
        .wrap_err("seed staff member")?;
    Ok(())
}

#[given(r#"an unassigned task titled "{title}""#)]
fn unassigned_task(world: &mut TaskLifecycleWorld, title: String) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create_task(CreateTaskRequest::new(title)))
        .wrap_err("create task for lifecycle scenario")?;
    world.task_id = Some(created.id().clone());
    Ok(())
}
