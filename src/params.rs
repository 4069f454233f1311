//! Generation knobs.
//!
//! Every limit and feature toggle the factories consult lives in
//! [`ProductionParams`]. The `Default` impl is the baseline profile; TOML
//! profiles only name the fields they change.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionParams {
    /// Complexity budget of the whole program.
    pub complexity_limit: u64,
    /// Statements per block.
    pub statement_limit: u64,
    /// Operators per expression.
    pub operator_limit: u64,
    /// Klasses and interfaces besides the main klass.
    pub classes_limit: u64,
    /// Functions declared per klass.
    pub member_functions_limit: u64,
    /// Explicit arguments per function.
    pub member_functions_arg_limit: u64,
    /// Fields per klass.
    pub data_member_limit: u64,
    /// Explicit constructors per klass.
    pub constructors_limit: u64,
    /// Interfaces a klass implements.
    pub implementation_limit: u64,
    /// Maximum array rank.
    pub dimensions_limit: u32,
    /// Length of every array dimension created.
    pub array_size: u64,
    /// Labelled cases per switch.
    pub switch_case_limit: u64,
    /// Draws allowed per case label before a selector type is abandoned.
    pub switch_case_retry_limit: u64,
    /// Maximum length of a string literal.
    pub string_literal_size_limit: u64,
    /// Significant decimal digits kept in floating literals.
    pub floating_point_precision: u32,
    /// Minimum control-flow nesting of each klass.
    pub min_cfg_depth: u32,
    /// Maximum control-flow nesting of each klass.
    pub max_cfg_depth: u32,
    /// Injection attempts made by the minimum-depth repair.
    pub depth_repair_attempts: u64,
    /// Ceiling on production attempts in one run.
    pub production_limit: u64,
    /// Share of the complexity budget that becomes loop iterations.
    pub loop_iteration_ratio: f64,
    /// Name of the klass holding the test entry point.
    pub main_class_name: String,

    pub disable_arrays: bool,
    pub disable_inheritance: bool,
    pub disable_interfaces: bool,
    pub disable_final_variables: bool,
    pub disable_final_classes: bool,
    pub disable_final_methods: bool,
    pub disable_static: bool,
    pub disable_switch: bool,
    pub disable_try_catch: bool,
    pub disable_while: bool,
    pub disable_do_while: bool,
    pub disable_for: bool,
    pub disable_if: bool,
    pub disable_functions: bool,
    pub disable_classes: bool,
    /// No local declarations inside blocks.
    pub disable_vars_in_block: bool,
    /// Only the owner's own symbols are visible.
    pub disable_external_symbols: bool,
}

impl Default for ProductionParams {
    fn default() -> Self {
        Self {
            complexity_limit: 10_000_000,
            statement_limit: 12,
            operator_limit: 6,
            classes_limit: 4,
            member_functions_limit: 4,
            member_functions_arg_limit: 3,
            data_member_limit: 4,
            constructors_limit: 2,
            implementation_limit: 2,
            dimensions_limit: 3,
            array_size: 4,
            switch_case_limit: 4,
            switch_case_retry_limit: 10,
            string_literal_size_limit: 10,
            floating_point_precision: 8,
            min_cfg_depth: 1,
            max_cfg_depth: 3,
            depth_repair_attempts: 8,
            production_limit: 2_000_000,
            loop_iteration_ratio: 0.0001,
            main_class_name: "Test".to_string(),
            disable_arrays: false,
            disable_inheritance: false,
            disable_interfaces: false,
            disable_final_variables: false,
            disable_final_classes: false,
            disable_final_methods: false,
            disable_static: false,
            disable_switch: false,
            disable_try_catch: false,
            disable_while: false,
            disable_do_while: false,
            disable_for: false,
            disable_if: false,
            disable_functions: false,
            disable_classes: false,
            disable_vars_in_block: false,
            disable_external_symbols: false,
        }
    }
}

impl ProductionParams {
    /// A small configuration that generates quickly. Used by tests and the
    /// `minimal` profile.
    pub fn small() -> Self {
        Self {
            complexity_limit: 20_000,
            statement_limit: 5,
            operator_limit: 3,
            classes_limit: 2,
            member_functions_limit: 2,
            member_functions_arg_limit: 2,
            data_member_limit: 2,
            constructors_limit: 1,
            implementation_limit: 1,
            dimensions_limit: 2,
            production_limit: 200_000,
            loop_iteration_ratio: 0.01,
            ..Self::default()
        }
    }

    /// Deepest control-flow nesting a body may reach. The minimum wins
    /// when the two bounds cross.
    pub fn max_depth(&self) -> u32 {
        self.max_cfg_depth.max(self.min_cfg_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_take_defaults() {
        let params: ProductionParams =
            toml::from_str("statement_limit = 3\ndisable_switch = true\n").expect("valid toml");
        assert_eq!(params.statement_limit, 3);
        assert!(params.disable_switch);
        assert_eq!(params.operator_limit, ProductionParams::default().operator_limit);
        assert_eq!(params.main_class_name, "Test");
    }

    #[test]
    fn small_keeps_toggles_off() {
        let small = ProductionParams::small();
        assert!(small.complexity_limit < ProductionParams::default().complexity_limit);
        assert!(!small.disable_arrays && !small.disable_classes);
    }
}
