#![no_main]

use avl_map::model::CursorEquivalenceInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: CursorEquivalenceInput| {
    avl_map::model::run_cursor_equivalence(input.keys, input.ops);
});
