//! Built-in demo recording.
//!
//! Traces a small C program that declares a local, takes its address,
//! allocates a heap node, writes through it and frees it. Addresses come
//! from an [`AddressLayout`], so every run produces the same trace.

use memviz_core::MemoryAddress;
use memviz_memory::{
    AddressLayout, HeapObject, MemoryResult, OperationKind, Pointer, StackFrame, ValueKind,
    Variable,
};
use memviz_replay::{Recording, ReplayResult, SimulationStep};

const SOURCE: &str = "\
typedef struct Node { int value; struct Node *next; } Node;

int main() {
    int x = 42;
    int *p = &x;
    Node *head = malloc(sizeof(Node));
    head->value = x;
    free(head);
    return 0;
}
";

struct Addresses {
    frame: MemoryAddress,
    x: MemoryAddress,
    p: MemoryAddress,
    head: MemoryAddress,
    node: MemoryAddress,
}

impl Addresses {
    fn assign() -> Self {
        let mut layout = AddressLayout::new();
        let frame = layout.stack_pointer();
        let x = layout.push_stack(4);
        let p = layout.push_stack(8);
        let head = layout.push_stack(8);
        let node = layout.alloc_heap(16);
        Self {
            frame,
            x,
            p,
            head,
            node,
        }
    }
}

/// Locals of `main` that are live at a given line
struct Locals {
    p: Option<MemoryAddress>,
    head: Option<MemoryAddress>,
}

fn main_frame(addrs: &Addresses, line: u32, locals: &Locals) -> MemoryResult<StackFrame> {
    let mut frame = StackFrame::new("main", addrs.frame, line)?
        .with_variable(Variable::new("x", ValueKind::Integer, addrs.x, 4)?.with_value("42"))?;

    if let Some(target) = locals.p {
        let mut p = Variable::new("p", ValueKind::Pointer, addrs.p, 8)?;
        p.set_pointer_target(target)?;
        frame.add_variable(p)?;
    }
    if let Some(target) = locals.head {
        let mut head = Variable::new("head", ValueKind::Pointer, addrs.head, 8)?;
        head.set_pointer_target(target)?;
        frame.add_variable(head)?;
    }
    Ok(frame)
}

fn node(addrs: &Addresses, value: Option<&str>) -> MemoryResult<HeapObject> {
    let mut field = Variable::new("value", ValueKind::Integer, addrs.node, 4)?;
    if let Some(value) = value {
        field.update_value(value);
    }
    let mut next = Variable::new("next", ValueKind::Pointer, addrs.node.offset(8), 8)?;
    next.clear_pointer_target();

    HeapObject::new("Node", ValueKind::Struct, addrs.node, 16)?
        .with_field(field)?
        .with_field(next)
}

/// Build the demo recording
///
/// # Errors
///
/// Returns error only if the fixed trace is internally inconsistent
pub fn linked_node() -> ReplayResult<Recording> {
    let addrs = Addresses::assign();
    let p_to_x = Pointer::new("p", addrs.p, addrs.x)?.with_label("&x");
    let head_to_node = Pointer::new("head", addrs.head, addrs.node)?.with_label("malloc");

    let mut freed = node(&addrs, Some("42"))?;
    freed.deallocate()?;
    let dangling = Pointer::new("head", addrs.head, addrs.node)?.with_label("dangling");

    let steps = vec![
        SimulationStep::builder(0, 4, "int x = 42;", OperationKind::Declaration)
            .description("Declare x on the stack and initialize it to 42")
            .frame(main_frame(&addrs, 4, &Locals { p: None, head: None })?)
            .build()?,
        SimulationStep::builder(1, 5, "int *p = &x;", OperationKind::PointerAssignment)
            .description("Point p at x")
            .frame(main_frame(&addrs, 5, &Locals { p: Some(addrs.x), head: None })?)
            .pointer(p_to_x.clone())
            .build()?,
        SimulationStep::builder(2, 6, "Node *head = malloc(sizeof(Node));", OperationKind::Allocation)
            .description("Allocate a 16-byte Node on the heap")
            .frame(main_frame(
                &addrs,
                6,
                &Locals {
                    p: Some(addrs.x),
                    head: Some(addrs.node),
                },
            )?)
            .heap_object(node(&addrs, None)?)
            .pointer(p_to_x.clone())
            .pointer(head_to_node.clone())
            .build()?,
        SimulationStep::builder(3, 7, "head->value = x;", OperationKind::MemberAccess)
            .description("Copy x into the node's value field")
            .frame(main_frame(
                &addrs,
                7,
                &Locals {
                    p: Some(addrs.x),
                    head: Some(addrs.node),
                },
            )?)
            .heap_object(node(&addrs, Some("42"))?)
            .pointer(p_to_x.clone())
            .pointer(head_to_node)
            .build()?,
        SimulationStep::builder(4, 8, "free(head);", OperationKind::Deallocation)
            .description("Free the node; head now dangles")
            .frame(main_frame(
                &addrs,
                8,
                &Locals {
                    p: Some(addrs.x),
                    head: Some(addrs.node),
                },
            )?)
            .heap_object(freed)
            .pointer(p_to_x)
            .pointer(dangling)
            .build()?,
        SimulationStep::builder(5, 9, "return 0;", OperationKind::FunctionReturn)
            .description("Return from main and pop its frame")
            .build()?,
    ];

    Ok(steps
        .into_iter()
        .fold(Recording::new(SOURCE, "c"), Recording::with_step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_deterministic() {
        let a = linked_node().unwrap();
        let b = linked_node().unwrap();
        let addrs = |r: &Recording| -> Vec<String> {
            r.steps
                .iter()
                .flat_map(|s| s.frames().iter().flat_map(|f| f.variables()))
                .map(|v| v.address().to_string())
                .collect()
        };
        assert_eq!(addrs(&a), addrs(&b));
    }

    #[test]
    fn test_sample_shape() {
        let rec = linked_node().unwrap();
        assert_eq!(rec.len(), 6);
        assert_eq!(rec.language, "c");

        let alloc = &rec.steps[2];
        assert_eq!(alloc.operation(), OperationKind::Allocation);
        assert_eq!(alloc.heap()[0].address().to_string(), "0x1000");
        assert_eq!(alloc.frames()[0].size(), 20);

        let free = &rec.steps[4];
        assert!(!free.heap()[0].is_allocated());
        assert!(free.frames()[0].variables().all(|v| v.is_initialized()));

        assert!(rec.steps[5].frames().is_empty());
    }

    #[test]
    fn test_sample_loads_as_replay() {
        let replay = linked_node().unwrap().into_aggregate().unwrap();
        assert_eq!(replay.total_steps(), 6);
    }
}
