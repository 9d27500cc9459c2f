mod brackets;
mod common;
mod ratios;
