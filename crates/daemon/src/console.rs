// SPDX-License-Identifier: MIT

//! Line-based operator console (§4.9, §6): `create`, `create batch`,
//! `status`, `stats`, `clients`, `queue`, `clear-deadletter`,
//! `reprocess-deadletter`, `exit`. Synchronous from the operator's point of
//! view — every submission is persisted before the prompt returns.

use crate::context::ServerContext;
use std::io::Write;
use std::sync::Arc;
use td_core::{Task, TaskKind};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Continue,
    Exit,
}

pub async fn run(ctx: Arc<ServerContext>) {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    print_prompt();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if handle_line(line.trim(), &ctx) == Outcome::Exit {
                    std::process::exit(0);
                }
                print_prompt();
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "console read error, shutting down console");
                break;
            }
        }
    }
}

fn print_prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn handle_line(line: &str, ctx: &ServerContext) -> Outcome {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Outcome::Continue;
    };
    let rest: Vec<&str> = words.collect();
    match cmd {
        "create" => cmd_create(&rest, ctx),
        "status" => cmd_status(ctx),
        "stats" => cmd_stats(ctx),
        "clients" => cmd_clients(ctx),
        "queue" => cmd_queue(ctx),
        "clear-deadletter" => cmd_clear_deadletter(ctx),
        "reprocess-deadletter" => cmd_reprocess_deadletter(ctx),
        "exit" => return Outcome::Exit,
        other => println!("unrecognized command: {other}"),
    }
    Outcome::Continue
}

fn submit(kind: &str, payload: String, ctx: &ServerContext) -> Task {
    let now = ctx.now_ms();
    let task = Task::new(ctx.next_task_id(), TaskKind::new(kind), payload, now);
    if let Err(e) = ctx.persistence.save(&task) {
        tracing::warn!(task = %task.id, error = %e, "persistence error while saving submitted task");
    }
    ctx.ready_queue.push(task.clone());
    task
}

fn cmd_create(args: &[&str], ctx: &ServerContext) {
    if args.first() == Some(&"batch") {
        return cmd_create_batch(&args[1..], ctx);
    }
    let Some((&kind, rest)) = args.split_first() else {
        println!("usage: create <kind> <data>");
        return;
    };
    if rest.is_empty() {
        println!("usage: create <kind> <data>");
        return;
    }
    let task = submit(kind, rest.join(" "), ctx);
    println!("created {}", task.id);
}

fn cmd_create_batch(args: &[&str], ctx: &ServerContext) {
    let (Some(&kind), Some(&count_str)) = (args.first(), args.get(1)) else {
        println!("usage: create batch <kind> <count> [data]");
        return;
    };
    let Ok(count) = count_str.parse::<u32>() else {
        println!("invalid count: {count_str}");
        return;
    };
    let payload_template = args[2.min(args.len())..].join(" ");
    for i in 0..count {
        let payload = if payload_template.is_empty() { i.to_string() } else { payload_template.clone() };
        let task = submit(kind, payload, ctx);
        println!("created {}", task.id);
    }
}

fn cmd_status(ctx: &ServerContext) {
    println!(
        "server {} | workers={} ready={} dead_letter={}",
        ctx.server_id,
        ctx.registry.count(),
        ctx.ready_queue.len(),
        ctx.dead_letter_queue.len(),
    );
}

fn cmd_stats(ctx: &ServerContext) {
    match ctx.persistence.statistics() {
        Ok(s) => println!(
            "pending={} in_progress={} completed={} failed={} dead_letter={} total={}",
            s.pending, s.in_progress, s.completed, s.failed, s.dead_letter, s.total
        ),
        Err(e) => println!("error reading statistics: {e}"),
    }
}

fn cmd_clients(ctx: &ServerContext) {
    let workers = ctx.registry.snapshot();
    if workers.is_empty() {
        println!("no connected workers");
        return;
    }
    for w in workers {
        let info = w.info();
        let caps = info.capabilities.map(|c| c.join(",")).unwrap_or_else(|| "*".to_string());
        println!(
            "{} name={} status={:?} capabilities={} in_flight={}",
            info.id,
            info.name.unwrap_or_else(|| "-".to_string()),
            info.status,
            caps,
            info.in_flight_task_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }
}

fn cmd_queue(ctx: &ServerContext) {
    println!("ready={} dead_letter={}", ctx.ready_queue.len(), ctx.dead_letter_queue.len());
}

fn cmd_clear_deadletter(ctx: &ServerContext) {
    let drained = ctx.dead_letter_queue.drain_all();
    for task in &drained {
        if let Err(e) = ctx.persistence.delete(&task.id) {
            tracing::warn!(task = %task.id, error = %e, "persistence error while clearing dead-lettered task");
        }
    }
    println!("cleared {} dead-lettered task(s)", drained.len());
}

fn cmd_reprocess_deadletter(ctx: &ServerContext) {
    let drained = ctx.dead_letter_queue.drain_all();
    let now = ctx.now_ms();
    let count = drained.len();
    for mut task in drained {
        task.requeue_from_dead_letter(now);
        if let Err(e) = ctx.persistence.save(&task) {
            tracing::warn!(task = %task.id, error = %e, "persistence error while reprocessing dead-lettered task");
        }
        ctx.ready_queue.push(task);
    }
    println!("requeued {count} task(s) from dead letter");
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
