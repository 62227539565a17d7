//! Test suite for the AArch32 translator workspace.

#[cfg(test)]
mod core;
#[cfg(test)]
mod decodetree;
#[cfg(test)]
mod frontend;
