//! Logical planning, optimization and lowering over the employee fixture.


use quarry::quarry_operators::pretty_format as physical_format;
use quarry::quarry_planner::{create_physical_plan, optimize, pretty_format, JoinType};
use quarry::{col, count, lit_str, max, min, sum, DataFrame, EngineConfig, Error, LogicalPlan};
use test_data_gen::{employee_context, employee_table};

fn employee() -> DataFrame {
    DataFrame::new(LogicalPlan::scan("employee", employee_table(1024), vec![]))
}

fn scenario_a() -> DataFrame {
    employee()
        .filter(col("state").eq(lit_str("CO")))
        .project(vec![col("id"), col("first_name"), col("last_name")])
}

#[test]
fn test_pretty_print_selection_projection() {
    assert_eq!(
        pretty_format(scenario_a().logical_plan()),
        "Projection: #id, #first_name, #last_name\n\
         \tSelection: #state = 'CO'\n\
         \t\tScan: employee; projection=None\n"
    );
}

#[test]
fn test_push_down_with_selection() {
    let optimized = optimize(scenario_a().logical_plan()).unwrap();
    assert_eq!(
        pretty_format(&optimized),
        "Projection: #id, #first_name, #last_name\n\
         \tSelection: #state = 'CO'\n\
         \t\tScan: employee; projection=[id first_name last_name state]\n"
    );
}

#[test]
fn test_push_down_with_aggregate() {
    let df = employee().aggregate(
        vec![col("state")],
        vec![min(col("salary")), max(col("salary")), count(col("salary"))],
    );
    let optimized = optimize(df.logical_plan()).unwrap();
    assert_eq!(
        pretty_format(&optimized),
        "Aggregate: groupExpr=[#state], aggregateExpr=[MIN(#salary) MAX(#salary) COUNT(#salary)]\n\
         \tScan: employee; projection=[state salary]\n"
    );

    // COUNT has no accumulator.
    assert!(matches!(
        create_physical_plan(&optimized),
        Err(Error::UnsupportedAggregate(_))
    ));
}

#[test]
fn test_push_down_is_idempotent() {
    let df = employee()
        .filter(col("salary").gt(quarry::lit_long(10000)))
        .aggregate(vec![col("job_title")], vec![sum(col("salary"))])
        .limit(3);
    let once = optimize(df.logical_plan()).unwrap();
    let twice = optimize(&once).unwrap();
    assert_eq!(pretty_format(&once), pretty_format(&twice));
    assert!(pretty_format(&once).ends_with("projection=[job_title salary]\n"));
}

#[test]
fn test_optimized_schema_is_unchanged() {
    let df = scenario_a();
    let optimized = optimize(df.logical_plan()).unwrap();
    assert_eq!(optimized.schema().unwrap(), df.schema().unwrap());
}

#[test]
fn test_physical_plan_after_push_down() {
    let optimized = optimize(scenario_a().logical_plan()).unwrap();
    let physical = create_physical_plan(&optimized).unwrap();
    assert_eq!(
        physical_format(&physical),
        "ProjectionExec: [#0 #1 #2]\n\
         \tSelectionExec: #3 = 'CO'\n\
         \t\tScanExec: schema=[id: int64, first_name: utf8, last_name: utf8, state: utf8], \
         projection=[id first_name last_name state]\n"
    );
}

#[test]
fn test_join_is_rejected() {
    let plan = LogicalPlan::Join {
        left: Box::new(employee().into_logical_plan()),
        right: Box::new(employee().into_logical_plan()),
        join_type: JoinType::Left,
        on: vec![("id".into(), "id".into())],
    };
    assert!(matches!(optimize(&plan), Err(Error::UnsupportedPlan(_))));
    assert!(matches!(
        create_physical_plan(&plan),
        Err(Error::UnsupportedPlan(_))
    ));
}

#[test]
fn test_context_skips_optimizer_when_disabled() {
    let ctx = employee_context(EngineConfig {
        optimize: false,
        ..EngineConfig::default()
    });
    let df = ctx
        .table("employee")
        .unwrap()
        .project(vec![col("state")]);
    let plan = ctx.optimized_plan(&df).unwrap();
    assert!(pretty_format(&plan).ends_with("projection=None\n"));
}
