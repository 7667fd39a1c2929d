//! The ordered Brick migration rules.
//!
//! Order matters. Several rules key off types produced by an earlier rule
//! (`meters_fix` runs a second time once `electricalmeter_fix` has renamed
//! `Electric_Meter`), and `deprecation_fix` runs last so that hand-written
//! replacements win over the ontology's generic ones.

use std::collections::HashMap;

use super::engine::Rule;
use crate::model::iri::BuildingNamespace;

/// Global rules plus per-building rules, built once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    global: Vec<Rule>,
    by_building: HashMap<String, Vec<Rule>>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to the global list.
    pub fn push_global(&mut self, rule: Rule) {
        self.global.push(rule);
    }

    /// Append a rule that only runs for `building`.
    pub fn push_for_building(&mut self, building: &str, rule: Rule) {
        self.by_building
            .entry(building.to_string())
            .or_default()
            .push(rule);
    }

    /// Rules run for every building, in order.
    pub fn global(&self) -> &[Rule] {
        &self.global
    }

    /// Rules specific to `building`; empty for most buildings.
    pub fn for_building(&self, building: &str) -> &[Rule] {
        self.by_building
            .get(building)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The migration rules for the Brick 1.3 building graphs.
    pub fn brick_migrations() -> Self {
        let mut registry = Self::new();
        for rule in [
            retype("heating_demand_fix", "Heating_Demand", "Heating_Demand_Sensor"),
            chilled_water_bypass_valve_fix(),
            substance_retype(
                "ent_p_sens_fix",
                "Return_Pressure_Sensor",
                "Pressure_Sensor",
                "hasSubstance",
                "Entering_Chilled_Water",
            ),
            substance_retype(
                "lev_p_sens_fix",
                "Supply_Pressure_Sensor",
                "Pressure_Sensor",
                "hasSubstance",
                "Leaving_Chilled_Water",
            ),
            substance_retype(
                "chwr_ts_fix",
                "Min_Chilled_Water_Supply_Temperature_Setpoint",
                "Min_Water_Temperature_Setpoint",
                "ofSubstance",
                "Leaving_Chilled_Water",
            ),
            reheat_coil_fix(),
            boiler_fix(),
            retype(
                "bldg26_pump_fix",
                "Chilled_Water_Pump_VFD_Speed",
                "Motor_Speed_Sensor",
            ),
            retype(
                "cooling_pct_fix",
                "Cooling_Request_Percent_Setpoint",
                "Leaving_Chilled_Water_Temperature_Setpoint",
            ),
            retype("cooling_demand_fix", "Cooling_Demand", "Cooling_Demand_Sensor"),
            substance_retype(
                "chwsp_fix",
                "Chilled_Water_Supply_Pressure",
                "Pressure_Sensor",
                "hasSubstance",
                "Leaving_Chilled_Water",
            ),
            substance_retype(
                "chwrt_fix",
                "Chilled_Water_Return_Pressure",
                "Pressure_Sensor",
                "hasSubstance",
                "Entering_Chilled_Water",
            ),
            substance_retype(
                "oad_fix",
                "Outside_Air_Damper_Command",
                "Damper_Command",
                "hasSubstance",
                "Outside_Air",
            ),
            // Assumes a bare "Mode" point is a mode status.
            retype("mode_fix", "Mode", "Mode_Status"),
            substance_retype(
                "chwv_fix",
                "Chilled_Water_Valve_Command",
                "Valve_Command",
                "hasSubstance",
                "Chilled_Water",
            ),
            area_unit_fix(),
            // Assumes "flow" refers to a sensor.
            retype(
                "bldg4_supflow_fix",
                "Supply_Air_flow",
                "Supply_Air_Flow_Sensor",
            ),
            substance_retype(
                "hwv_fix",
                "Hot_Water_Valve_Command",
                "Valve_Command",
                "hasSubstance",
                "Hot_Water",
            ),
            retype(
                "chws_fix",
                "Chilled_Water_Supply_Temperature_Setpoint",
                "Supply_Chilled_Water_Temperature_Setpoint",
            ),
            retype(
                "chwr_fix",
                "Chilled_Water_Return_Temperature_Setpoint",
                "Return_Chilled_Water_Temperature_Setpoint",
            ),
            meters_fix(),
            electrical_meter_fix(),
            meters_fix(),
            deprecation_fix(),
        ] {
            registry.push_global(rule);
        }

        registry.push_for_building("bldg43", bldg43_add_chiller_fix());
        registry.push_for_building("bldg6", bldg6_room_zone_fix());
        registry
    }
}

/// `?this a brick:<from>` becomes `?this a brick:<to>`.
pub fn retype(name: &str, from: &str, to: &str) -> Rule {
    Rule::new(
        name,
        format!(
            "DELETE {{ ?this a brick:{from} }}\n\
             INSERT {{ ?this a brick:{to} }}\n\
             WHERE {{ ?this a brick:{from} }}"
        ),
    )
}

/// [`retype`] plus a substance annotation on the retyped entity.
fn substance_retype(name: &str, from: &str, to: &str, predicate: &str, substance: &str) -> Rule {
    Rule::new(
        name,
        format!(
            "DELETE {{ ?this a brick:{from} }}\n\
             INSERT {{ ?this a brick:{to} ; brick:{predicate} brick:{substance} }}\n\
             WHERE {{ ?this a brick:{from} }}"
        ),
    )
}

fn boiler_fix() -> Rule {
    Rule::new(
        "boiler_fix",
        "DELETE { ?this a brick:Hot_Water_Supply_Flow_Sensor }
         INSERT { ?this a brick:Hot_Water_Entering_Flow_Sensor , brick:Point }
         WHERE { ?this a brick:Hot_Water_Supply_Flow_Sensor }",
    )
}

/// A chilled-water bypass valve listed as a chiller point becomes a bypass
/// valve part with its own status point.
fn chilled_water_bypass_valve_fix() -> Rule {
    let status = BuildingNamespace::new("bldg42").entity_iri("BypassValveStatus");
    Rule::new(
        "bldg42_chwbp_fix",
        format!(
            "DELETE {{ ?this a brick:Chilled_Water_Bypass_Valve .
                      ?chiller brick:hasPoint ?this }}
             INSERT {{ ?this a brick:Bypass_Valve ;
                          brick:hasSubstance brick:Chilled_Water ;
                          brick:hasPoint <{status}> .
                      <{status}> a brick:Valve_Status .
                      ?chiller brick:hasPart ?this }}
             WHERE {{ ?this a brick:Chilled_Water_Bypass_Valve .
                     ?chiller brick:hasPoint ?this }}"
        ),
    )
}

/// A VAV with a reheat coil part becomes an RVAV; the coil is dropped.
fn reheat_coil_fix() -> Rule {
    Rule::new(
        "r_coil_fix",
        "DELETE { ?this a brick:Reheat_Coil .
                  ?vav brick:hasPart ?this }
         INSERT { ?vav a brick:RVAV }
         WHERE { ?this a brick:Reheat_Coil .
                 ?vav brick:hasPart ?this }",
    )
}

/// `brick:hasUnits unit:FT_2` becomes `brick:hasUnit unit:FT2`.
fn area_unit_fix() -> Rule {
    Rule::new(
        "ft2_fix",
        "DELETE { ?this brick:hasUnits unit:FT_2 }
         INSERT { ?this brick:hasUnit unit:FT2 }
         WHERE { ?this brick:hasUnits unit:FT_2 }",
    )
}

/// Electrical meters relate to what they measure with `brick:meters`, not
/// `brick:isPointOf`.
fn meters_fix() -> Rule {
    Rule::new(
        "meters_fix",
        "DELETE { ?meter brick:isPointOf ?this }
         INSERT { ?meter brick:meters ?this }
         WHERE { ?meter a brick:Electrical_Meter ;
                        brick:isPointOf ?this }",
    )
}

fn electrical_meter_fix() -> Rule {
    retype("electricalmeter_fix", "Electric_Meter", "Electrical_Meter")
}

/// Rewrite instances of any class the ontology marks deprecated to its
/// declared replacement.
pub fn deprecation_fix() -> Rule {
    Rule::new(
        "deprecation_fix",
        "DELETE { ?this a ?class }
         INSERT { ?this a ?newClass }
         WHERE { ?this a ?class .
                 ?class owl:deprecated true ;
                        brick:deprecatedInVersion ?depver ;
                        brick:isReplacedBy ?newClass }",
    )
}

fn bldg43_add_chiller_fix() -> Rule {
    let chiller = BuildingNamespace::new("bldg43").entity_iri("chiller");
    Rule::new(
        "bldg43_add_chiller_fix",
        format!("INSERT DATA {{ <{chiller}> a brick:Chiller }}"),
    )
}

/// Untyped entities with points whose IRI contains `VAVRM` are zones.
fn bldg6_room_zone_fix() -> Rule {
    Rule::new(
        "bldg6_rm_fix",
        "INSERT { ?this a brick:HVAC_Zone }
         WHERE { ?this brick:hasPoint ?that .
                 FILTER regex(str(?this), \"VAVRM\")
                 FILTER NOT EXISTS { ?this a ?y } }",
    )
}
