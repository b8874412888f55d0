pub(crate) mod faulty_db;

pub(crate) mod gated_db;

pub(crate) mod logging;

pub(crate) mod node;
