//! Investment input model and loading

mod data;
pub mod loader;

pub use data::{
    estimate_notary_fees, FiscalElection, FurnishedKind, InvestmentParameters, LandlordStatus,
    Letting, PropertyKind, TaxScheme,
};
pub use loader::{load_parameters, load_scenarios, load_scenarios_from_reader, Scenario};

#[cfg(test)]
pub(crate) use data::fixtures;
