use avl_map::AvlMap;

fn main() {
    env_logger::init();

    let map = run();
    log::info!("{} entries, height {}", map.len(), map.height());
}

fn run() -> AvlMap<i32, i32> {
    let mut map: AvlMap<i32, i32> = AvlMap::new();

    for (key, value) in [(0, 0), (1, -1), (2, -101), (3, 10), (4, 10), (5, 30)] {
        map.insert(key, value);
        map.assert_invariants();
        log::debug!("{map:?}");
    }
    log::info!("{} entries, height {}", map.len(), map.height());

    *map.get_or_insert_default(6) += 7;
    map.insert(3, 33);
    map.assert_invariants();

    let mut curs = map.cursor_last();
    while let Some((key, value)) = curs.get() {
        log::debug!("{key} => {value}");
        if curs.move_prev().is_err() {
            break;
        }
    }

    let removed = map.remove(&2);
    assert_eq!(removed, Some(-101));
    map.assert_invariants();

    map
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn walkthrough_state() {
        let map = run();

        assert_eq!(
            map.iter().map(|(&k, &v)| (k, v)).collect::<Vec<_>>(),
            [(0, 0), (1, -1), (3, 33), (4, 10), (5, 30), (6, 7)]
        );
        assert!(map.height() <= 3);
    }
}
