
mod common {
    use std::io::Write;

    pub fn init() {
        let _ = env_logger::builder()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .is_test(true)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use phtree_store::{IntoPhKey, PhTree, Point, TreeMapping};

    struct GridMapping;

    impl TreeMapping<u32, 2> for GridMapping {
        type Index = (i32, i32);
        type Element = (i32, i32);

        fn point_of(&self, index: &Self::Index) -> Point<u32, 2> {
            Point::new([index.0.into_ph_key(), index.1.into_ph_key()])
        }

        fn element_of(&self, index: &Self::Index) -> Option<Self::Element> {
            Some(*index)
        }
    }

    #[test]
    fn test_insert_is_idempotent_per_point(
    ) -> Result<(), Box<dyn std::error::Error>> {
        super::common::init();

        let mut tree = PhTree::new(GridMapping);

        for _ in 0..3 {
            let element = tree.insert(&(25, 25))?;
            assert_eq!(*element, (25, 25));
        }
        assert_eq!(tree.len(), 1);

        let mut visited = 0;
        tree.for_each(|_| visited += 1);
        assert_eq!(visited, 1);

        Ok(())
    }

    #[test]
    fn test_find_after_inserts_and_removes(
    ) -> Result<(), Box<dyn std::error::Error>> {
        super::common::init();

        let mut tree = PhTree::new(GridMapping);
        let indexes: Vec<(i32, i32)> =
            (-10..=10).step_by(2).map(|i| (i, 0)).collect();

        for index in &indexes {
            tree.insert(index)?;
        }

        tree.remove(&(2, 0));
        tree.remove(&(-8, 0));

        assert_eq!(tree.find(&(-10, 0)), Some(&(-10, 0)));
        assert_eq!(tree.find(&(2, 0)), None);
        assert_eq!(tree.find(&(-8, 0)), None);
        // never inserted
        assert_eq!(tree.find(&(20, 0)), None);
        assert_eq!(tree.find(&(0, 1)), None);

        assert_eq!(tree.len(), indexes.len() - 2);

        Ok(())
    }

    #[test]
    fn test_insert_extremes() -> Result<(), Box<dyn std::error::Error>> {
        let mut tree = PhTree::new(GridMapping);

        tree.insert(&(i32::MIN, i32::MIN))?;
        tree.insert(&(i32::MAX, i32::MAX))?;
        tree.insert(&(i32::MIN, i32::MAX))?;
        tree.insert(&(0, 0))?;

        assert_eq!(
            tree.find(&(i32::MIN, i32::MIN)),
            Some(&(i32::MIN, i32::MIN))
        );
        assert_eq!(
            tree.find(&(i32::MAX, i32::MAX)),
            Some(&(i32::MAX, i32::MAX))
        );
        assert_eq!(
            tree.find(&(i32::MIN, i32::MAX)),
            Some(&(i32::MIN, i32::MAX))
        );
        assert_eq!(tree.find(&(i32::MAX, i32::MIN)), None);

        Ok(())
    }

    #[test]
    fn test_empty_after_symmetric_removes(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut tree = PhTree::new(GridMapping);
        let indexes: Vec<(i32, i32)> = (-50..50)
            .flat_map(|x| [(x, -x), (x * 100, x), (x, x)])
            .collect();

        for index in &indexes {
            tree.insert(index)?;
        }
        assert!(!tree.is_empty());

        for index in &indexes {
            tree.remove(index);
        }

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        // nothing is left hanging off the root
        let stats = tree.stats();
        assert_eq!(stats.node_count(), 0);
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.max_depth, 0);

        Ok(())
    }

    #[test]
    fn test_remove_absent_is_a_no_op(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut tree = PhTree::new(GridMapping);
        tree.insert(&(7, 7))?;
        tree.insert(&(7, 8))?;

        // same leaf, different entry
        tree.remove(&(7, 6));
        // a path that exists only partially
        tree.remove(&(7, 1000));
        // nowhere near anything stored
        tree.remove(&(-7, -7));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.find(&(7, 7)), Some(&(7, 7)));
        assert_eq!(tree.find(&(7, 8)), Some(&(7, 8)));

        Ok(())
    }

    #[test]
    fn test_find_mut_updates_element(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut tree = PhTree::new(GridMapping);
        tree.insert(&(1, 2))?;

        if let Some(element) = tree.find_mut(&(1, 2)) {
            *element = (42, 42);
        }

        assert_eq!(tree.find(&(1, 2)), Some(&(42, 42)));
        assert_eq!(tree.find_mut(&(3, 4)), None);

        Ok(())
    }

    #[test]
    fn test_iter_matches_for_each() -> Result<(), Box<dyn std::error::Error>>
    {
        let mut tree = PhTree::new(GridMapping);
        for x in -20..20 {
            tree.insert(&(x, x * x))?;
        }

        let mut for_each_order = Vec::new();
        tree.for_each(|element| for_each_order.push(*element));

        let iter_order: Vec<(i32, i32)> =
            tree.iter().map(|(_, element)| *element).collect();

        assert_eq!(for_each_order.len(), 40);
        assert_eq!(for_each_order, iter_order);

        // the iterator also delivers the points elements live at
        for (point, element) in tree.iter() {
            assert_eq!(
                point,
                tree.mapping().point_of(element),
            );
        }

        Ok(())
    }
}
