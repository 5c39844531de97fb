//! Order queues and command descriptions.
//!
//! Queues are internal state and need the unit allied. Command buttons
//! only need it typed, since the shown definition already implies them.

use crate::access::AccessContext;
use crate::error::QueryResult;
use crate::world::commands::{
    run_lengths, Command, CommandDescription, OPT_ALT, OPT_CTRL, OPT_INTERNAL, OPT_META, OPT_RIGHT,
    OPT_SHIFT,
};
use crate::world::{CommandQueue, Unit, World};
use super::value::{Table, Value};
use super::{nothing, parse, Args, QueryRegistry};

const COMMANDS_USAGE: &str = "(unitID, count [, asTable]): count -1 for all, 0 for the size";

pub(crate) fn register(registry: &mut QueryRegistry) {
    registry.register("GetUnitCommands", get_unit_commands);
    registry.register("GetCommandQueue", get_unit_commands);
    registry.register("GetFactoryCommands", get_factory_commands);
    registry.register("GetUnitCurrentCommand", get_unit_current_command);
    registry.register("GetFactoryCounts", get_factory_counts);
    registry.register("GetFullBuildQueue", get_full_build_queue);
    registry.register("GetRealBuildQueue", get_real_build_queue);
    registry.register("GetUnitCmdDescs", get_unit_cmd_descs);
    registry.register("FindUnitCmdDesc", find_unit_cmd_desc);
}

// =============================================================================
// PACKING
// =============================================================================

fn options_table(options: u8) -> Table {
    Table::new()
        .with("coded", options)
        .with("alt", options & OPT_ALT != 0)
        .with("ctrl", options & OPT_CTRL != 0)
        .with("shift", options & OPT_SHIFT != 0)
        .with("right", options & OPT_RIGHT != 0)
        .with("meta", options & OPT_META != 0)
        .with("internal", options & OPT_INTERNAL != 0)
}

fn command_table(cmd: &Command) -> Value {
    Table::new()
        .with("id", cmd.id)
        .with("params", Table::array(cmd.params.iter().map(|&p| Value::fixed(p))))
        .with("options", options_table(cmd.options))
        .with("tag", cmd.tag)
        .into()
}

fn cmd_desc_table(desc: &CommandDescription) -> Value {
    Table::new()
        .with("id", desc.id)
        .with("type", desc.kind)
        .with("name", desc.name.as_str())
        .with("action", desc.action.as_str())
        .with("tooltip", desc.tooltip.as_str())
        .with("hidden", desc.hidden)
        .with("disabled", desc.disabled)
        .with("showUnique", desc.show_unique)
        .with("params", Table::array(desc.params.iter().map(String::as_str)))
        .into()
}

/// First `count` orders as a table, or the queue size. Negative counts
/// mean the whole queue.
fn pack_queue(queue: &CommandQueue, args: &Args<'_>) -> QueryResult {
    if args.is_none(2) {
        return Err(args.usage(COMMANDS_USAGE));
    }
    let count = args.check_int(2)?;
    let as_table = args.opt_bool(3, true);
    if !as_table || count == 0 {
        return Ok(vec![queue.len().into()]);
    }
    let take = usize::try_from(count).unwrap_or(queue.len());
    Ok(vec![Table::array(queue.iter().take(take).map(command_table)).into()])
}

/// `{ {[key] = count}, ... }`
fn runs_table(runs: &[(i64, u32)]) -> Value {
    Table::array(runs.iter().map(|&(key, count)| Table::new().with(key, count))).into()
}

// =============================================================================
// QUEUES
// =============================================================================

/// Factories report the orders given to each unit they finish; everyone
/// else their own queue.
fn get_unit_commands(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    pack_queue(unit.visible_queue(), &args)
}

/// A factory's own production queue; nothing for other units.
fn get_factory_commands(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    if !unit.capability.is_factory() {
        return nothing();
    }
    pack_queue(&unit.commands, &args)
}

/// `(unitID [, index = 1])` → `id, options, tag, params...`
fn get_unit_current_command(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let index = args.opt_int(2, 1)?.saturating_sub(1);
    let Some(cmd) = usize::try_from(index).ok().and_then(|i| unit.visible_queue().get(i)) else {
        return nothing();
    };
    let mut out = Vec::with_capacity(3 + cmd.params.len());
    out.push(cmd.id.into());
    out.push(cmd.options.into());
    out.push(cmd.tag.into());
    out.extend(cmd.params.iter().map(|&p| Value::fixed(p)));
    Ok(out)
}

/// `(unitID [, count = -1 [, includeCommands = false]])`
///
/// Runs of the factory queue keyed by `-commandID`, so build orders key
/// by definition id.
fn get_factory_counts(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    if !unit.capability.is_factory() {
        return nothing();
    }
    let count = args.opt_int(2, -1)?;
    let include_commands = args.opt_bool(3, false);
    let ids = unit
        .commands
        .iter()
        .filter(|cmd| include_commands || cmd.id < 0)
        .map(|cmd| -i64::from(cmd.id));
    let mut runs = run_lengths(ids);
    if let Ok(limit) = usize::try_from(count) {
        runs.truncate(limit);
    }
    Ok(vec![runs_table(&runs)])
}

fn can_build(world: &World, builder: &Unit, cmd: &Command) -> bool {
    let Some(buildee) = cmd.build_def().and_then(|id| world.defs.unit_def(id)) else {
        return false;
    };
    world
        .defs
        .unit_def(builder.def_id)
        .is_some_and(|d| d.build_options.iter().any(|o| o.eq_ignore_ascii_case(&buildee.name)))
}

fn build_queue(world: &World, ctx: &AccessContext, args: &Args<'_>, only_buildable: bool) -> QueryResult {
    let Some(unit) = parse::ally_unit(world, ctx, args, 1)? else {
        return nothing();
    };
    let defs = unit
        .commands
        .iter()
        .filter(|cmd| cmd.build_def().is_some())
        .filter(|cmd| !only_buildable || can_build(world, unit, cmd))
        .map(|cmd| -i64::from(cmd.id));
    let runs = run_lengths(defs);
    Ok(vec![runs_table(&runs), runs.len().into()])
}

/// Every build order, as runs of `{[defID] = count}` plus the run count.
fn get_full_build_queue(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    build_queue(world, ctx, &args, false)
}

/// Like [`get_full_build_queue`], limited to orders the unit can start.
fn get_real_build_queue(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    build_queue(world, ctx, &args, true)
}

// =============================================================================
// COMMAND DESCRIPTIONS
// =============================================================================

/// `(unitID [, first [, last]])`, 1-based and clamped.
fn get_unit_cmd_descs(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::typed_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let descs = &unit.cmd_descs;
    let Some(last) = descs.len().checked_sub(1) else {
        return Ok(vec![Table::new().into()]);
    };
    let clamp = |i: i64| i.saturating_sub(1).clamp(0, last as i64) as usize;
    let (first, end) = match (args.get(2), args.get(3)) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => (clamp(*a as i64), clamp(*b as i64)),
        (Some(Value::Number(a)), _) => (clamp(*a as i64), clamp(*a as i64)),
        _ => (0, last),
    };
    let slice = descs.get(first..=end).unwrap_or_default();
    Ok(vec![Table::array(slice.iter().map(cmd_desc_table)).into()])
}

/// 1-based index of the first button issuing `cmdID`.
fn find_unit_cmd_desc(world: &World, ctx: &AccessContext, args: Args<'_>) -> QueryResult {
    let Some(unit) = parse::typed_unit(world, ctx, &args, 1)? else {
        return nothing();
    };
    let id = args.check_int(2)?;
    let found = unit.cmd_descs.iter().position(|d| i64::from(d.id) == id);
    Ok(found.map(|i| vec![(i + 1).into()]).unwrap_or_default())
}
