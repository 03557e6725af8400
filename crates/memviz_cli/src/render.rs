//! Terminal rendering of replays and memory snapshots.

use console::{StyledObject, style};
use memviz_memory::{HeapObject, Pointer, StackFrame, Variable};
use memviz_replay::{ReplayStatus, ReplayView, SimulationStep};

fn status(status: ReplayStatus) -> StyledObject<String> {
    let text = status.to_string();
    match status {
        ReplayStatus::Ready => style(text).dim(),
        ReplayStatus::Running => style(text).green(),
        ReplayStatus::Paused | ReplayStatus::Reset => style(text).yellow(),
        ReplayStatus::Completed => style(text).cyan(),
        ReplayStatus::Error => style(text).red().bold(),
    }
}

/// One-based position, `-` before the first step
fn position(view: &ReplayView) -> String {
    if view.current_step_index < 0 {
        "-".to_string()
    } else {
        (view.current_step_index + 1).to_string()
    }
}

/// Compact one-line form of a step
pub fn step_line(step: &SimulationStep) -> String {
    format!(
        "{:>4}  line {:<4} {:<18} {}",
        step.step_number(),
        step.line(),
        step.operation().to_string(),
        style(step.code_line()).bold()
    )
}

/// Summary of a replay after an operation
pub fn view(view: &ReplayView) {
    println!("{} {}", style("replay").bold(), view.id);
    println!("  language  {}", view.language);
    println!("  status    {}", status(view.status));
    println!("  step      {}/{}", position(view), view.total_steps);
    if view.completed_at.is_some() {
        println!("  elapsed   {}", view.execution_time);
    }
    if let Some(message) = &view.error_message {
        println!("  error     {}", style(message).red());
    }
    for event in &view.events {
        println!("  {} {}", style("event").magenta(), event.name());
    }
    if let Some(step) = &view.current_step {
        println!();
        println!("{}", step_line(step));
    }
}

/// Full snapshot of one step
pub fn snapshot(step: &SimulationStep) {
    println!("{}", step_line(step));
    if !step.description().is_empty() {
        println!("      {}", style(step.description()).dim());
    }

    println!("{}", style("stack").underlined());
    if step.frames().is_empty() {
        println!("  {}", style("(empty)").dim());
    }
    step.frames().iter().for_each(frame);

    println!("{}", style("heap").underlined());
    if step.heap().is_empty() {
        println!("  {}", style("(empty)").dim());
    }
    step.heap().iter().for_each(heap_object);

    if !step.pointers().is_empty() {
        println!("{}", style("pointers").underlined());
        step.pointers().iter().for_each(pointer);
    }
}

fn frame(frame: &StackFrame) {
    println!(
        "  {}() @ {}  {} bytes, line {}",
        style(frame.function_name()).bold(),
        frame.base_address(),
        frame.size(),
        frame.line()
    );
    frame.variables().for_each(|v| variable(v, "    "));
}

fn heap_object(object: &HeapObject) {
    let state = if object.is_allocated() {
        style("live").green()
    } else {
        style("freed").red()
    };
    println!(
        "  {} {} @ {}  {} bytes [{}]",
        object.kind(),
        style(object.name()).bold(),
        object.address(),
        object.size(),
        state
    );
    object.fields().for_each(|f| variable(f, "    ."));
}

fn variable(var: &Variable, indent: &str) {
    let value = match var.value() {
        Some(value) => value.to_string(),
        None => style("<uninitialized>").dim().to_string(),
    };
    println!(
        "{}{} {} @ {} = {}",
        indent,
        var.kind(),
        var.name(),
        var.address(),
        value
    );
}

fn pointer(ptr: &Pointer) {
    let target = if ptr.is_valid() {
        style(ptr.target().to_string()).cyan()
    } else {
        style("null".to_string()).red()
    };
    let label = ptr.label().map(|l| format!("  ({})", l)).unwrap_or_default();
    println!("  {} {} -> {}{}", ptr.name(), ptr.source(), target, label);
}

/// Table of stored replays
pub fn list(views: &[ReplayView]) {
    if views.is_empty() {
        println!("{}", style("no replays stored").dim());
        return;
    }
    for view in views {
        println!(
            "{}  {:<10} {:>5}/{:<5} {}",
            view.id,
            status(view.status),
            position(view),
            view.total_steps,
            view.language
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memviz_memory::OperationKind;
    use memviz_replay::Recording;

    #[test]
    fn test_position_is_one_based() {
        let step = SimulationStep::builder(0, 3, "int x;", OperationKind::Declaration)
            .build()
            .unwrap();
        let mut replay = Recording::new("int x;", "c")
            .with_step(step)
            .into_aggregate()
            .unwrap();

        assert_eq!(position(&ReplayView::of(&replay)), "-");
        replay.start().unwrap();
        assert_eq!(position(&ReplayView::of(&replay)), "1");
    }

    #[test]
    fn test_step_line_mentions_code() {
        let step = SimulationStep::builder(7, 12, "free(p);", OperationKind::Deallocation)
            .build()
            .unwrap();
        let line = step_line(&step);
        assert!(line.contains("free(p);"));
        assert!(line.contains("12"));
    }
}
