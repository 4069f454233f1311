// src/generator.rs
//! Program generation entry point.

use std::fmt::Write as _;

use tracing::{info, warn};

use crate::builder::IrNodeBuilder;
use crate::context::GenContext;
use crate::error::ProductionResult;
use crate::ir::{Node, Program, TypeDefinition};
use crate::params::ProductionParams;
use crate::rule::{BudgetSplitter, Factory};

/// Produce one complete program from `seed`.
///
/// The class definitions and the main klass each receive a random share of
/// `complexity_limit`. A failed run yields nothing; callers retry with
/// another seed.
pub fn generate_program(seed: u64, params: ProductionParams) -> ProductionResult<Program> {
    info!(seed, complexity_limit = params.complexity_limit, "generating program");
    let mut ctx = GenContext::new(seed, params);
    let result = program(&mut ctx);
    match &result {
        Ok(program) => info!(
            seed,
            complexity = program.complexity(),
            depth = program.depth(),
            productions = ctx.limiter.used(),
            "program generated"
        ),
        Err(e) => warn!(seed, error = %e, productions = ctx.limiter.used(), "program generation failed"),
    }
    result
}

fn program(ctx: &mut GenContext) -> ProductionResult<Program> {
    let base = IrNodeBuilder::new()
        .statement_limit(ctx.params.statement_limit)
        .operator_limit(ctx.params.operator_limit)
        .level(0);
    let mut budget = BudgetSplitter::new(ctx.params.complexity_limit);

    let classes = if ctx.params.disable_classes {
        None
    } else {
        let share = budget.take_leaving(&mut ctx.rng, 1);
        let block = base
            .clone()
            .complexity_limit(share)
            .member_limit(ctx.params.classes_limit)
            .class_definition_block_factory()?
            .produce(ctx)?;
        budget.refund(share.saturating_sub(block.complexity()));
        Some(block)
    };

    let main = base
        .complexity_limit(budget.take_rest())
        .name(ctx.params.main_class_name.clone())
        .main_klass_factory()?
        .produce(ctx)?;
    Ok(Program {
        seed: ctx.rng.seed(),
        classes,
        main,
    })
}

/// One line per generated type: `Class_3 extends Class_1 implements
/// Interface_2`.
pub fn describe_hierarchy(program: &Program) -> String {
    let mut out = String::new();
    let definitions = program.classes.iter().flat_map(|c| &c.definitions);
    for definition in definitions {
        // Writing to a String cannot fail.
        let _ = match definition {
            TypeDefinition::Klass(k) => {
                let mut line = format!("class {} extends {}", k.name, k.parent);
                if !k.interfaces.is_empty() {
                    let names: Vec<String> = k.interfaces.iter().map(|i| i.to_string()).collect();
                    line.push_str(" implements ");
                    line.push_str(&names.join(", "));
                }
                writeln!(out, "{line}")
            }
            TypeDefinition::Interface(i) => match &i.parent {
                Some(parent) => writeln!(out, "interface {} extends {parent}", i.name),
                None => writeln!(out, "interface {}", i.name),
            },
        };
    }
    let _ = writeln!(out, "class {}", program.main.name);
    out
}
