pub mod deliverable;
pub mod delivery;
pub mod hiring;
pub mod modality;
pub mod quotation;
