#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, unreachable_pub)]
/*!

`signal-net`

A zero-delay boolean gate network. Gates live in a [circuit::Circuit], which owns them,
links them into a registry list for cost accounting, and pushes every value change
through the connected inputs before returning.

*/
#![doc = "## Simple Example\n```"]
#![doc = include_str!("../demos/simple.rs")]
#![doc = "\n```"]

pub mod circuit;
pub mod error;
pub mod gate;
pub mod graph;
pub mod terminal;
pub mod truth_table;
pub mod util;
