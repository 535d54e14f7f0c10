/* 📖 # Cache behavior test suite

The MockPal counts every read per path, which is what lets these tests tell a
cache hit from a fresh read. The tempfile tests at the end repeat the mode
behavior against the real filesystem, where files are actually edited.
*/

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use expect_test::expect;
    use fscache_base::{MockPal, PalHandle, RealPal};
    use tempfile::TempDir;

    use crate::{CacheMode, CacheStats, PathCache};

    fn cache_with(mock: &MockPal, mode: CacheMode) -> PathCache {
        PathCache::with_pal(PalHandle::new(mock.clone()), mode)
    }

    #[test]
    fn test_production_reads_storage_once() {
        let mock = MockPal::new();
        mock.add_file("/srv/page.html", b"<p>page</p>".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        for _ in 0..5 {
            assert_eq!(&*cache.load("/srv/page.html").unwrap(), b"<p>page</p>");
        }

        assert_eq!(mock.read_count("/srv/page.html"), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 4,
                misses: 1,
                bypassed_reads: 0,
                preloaded: 0,
            }
        );
    }

    #[test]
    fn test_production_keeps_first_content_after_edit() {
        let mock = MockPal::new();
        mock.add_file("/a.txt", b"v1".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        cache.load("/a.txt").unwrap();
        mock.add_file("/a.txt", b"v2".to_vec());

        assert_eq!(&*cache.load("/a.txt").unwrap(), b"v1");
    }

    #[test]
    fn test_production_still_checks_existence_on_hit() {
        let mock = MockPal::new();
        mock.add_file("/a.txt", b"a".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        cache.load("/a.txt").unwrap();
        mock.remove("/a.txt");

        assert!(cache.load("/a.txt").unwrap_err().is_not_found());
        assert_eq!(mock.stat_count("/a.txt"), 2);
    }

    #[test]
    fn test_development_reads_storage_every_time() {
        let mock = MockPal::new();
        mock.add_file("/a.txt", b"v1".to_vec());
        let cache = cache_with(&mock, CacheMode::Development);

        assert_eq!(&*cache.load("/a.txt").unwrap(), b"v1");
        mock.add_file("/a.txt", b"v2".to_vec());
        assert_eq!(&*cache.load("/a.txt").unwrap(), b"v2");
        cache.load("/a.txt").unwrap();

        assert_eq!(mock.read_count("/a.txt"), 3);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().bypassed_reads, 3);
    }

    #[test]
    fn test_development_ignores_preloaded_entries() {
        let mock = MockPal::new();
        mock.add_file("/a.txt", b"old".to_vec());
        let cache = cache_with(&mock, CacheMode::Development);

        cache.preload("/a.txt").unwrap();
        assert!(cache.contains("/a.txt").unwrap());
        mock.add_file("/a.txt", b"new".to_vec());

        assert_eq!(&*cache.load("/a.txt").unwrap(), b"new");
        assert_eq!(mock.read_count("/a.txt"), 2);
    }

    #[test]
    fn test_missing_file_is_not_found_and_not_cached() {
        let mock = MockPal::new();
        let cache = cache_with(&mock, CacheMode::Production);

        let err = cache.load("/nope.txt").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(Path::new("/nope.txt")));
        assert!(cache.is_empty());
        assert_eq!(mock.total_reads(), 0);
    }

    #[test]
    fn test_permission_denied_surfaces_as_not_found() {
        let mock = MockPal::new();
        mock.add_forbidden("/secret.key");
        let cache = cache_with(&mock, CacheMode::Production);

        let err = cache.load("/secret.key").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.root_cause().to_string(), "permission denied");
    }

    #[test]
    fn test_read_failure_after_stat_is_read_error() {
        let mock = MockPal::new();
        mock.add_unreadable("/flaky.bin");
        mock.add_directory("/srv");

        for mode in [CacheMode::Production, CacheMode::Development] {
            let cache = cache_with(&mock, mode);
            assert!(cache.load("/flaky.bin").unwrap_err().is_read());
            assert!(cache.load("/srv").unwrap_err().is_read());
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn test_unresolvable_working_directory() {
        let mock = MockPal::new().without_current_dir();
        mock.add_file("/a.txt", b"a".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        assert!(cache.load("a.txt").unwrap_err().is_path_resolution());
        assert!(cache.preload("a.txt").unwrap_err().is_path_resolution());
        assert_eq!(&*cache.load("/a.txt").unwrap(), b"a");
    }

    #[test]
    fn test_different_spellings_share_one_entry() {
        let mock = MockPal::new().with_current_dir("/srv/site");
        mock.add_file("/srv/site/docs/a.txt", b"a".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        cache.load("docs/a.txt").unwrap();
        cache.load("/srv/site/docs/a.txt").unwrap();
        cache.load("./docs/../docs/./a.txt").unwrap();
        cache.load("/srv/other/../site/docs/a.txt").unwrap();

        assert_eq!(mock.read_count("/srv/site/docs/a.txt"), 1);
        expect![[r#"
            [
                "/srv/site/docs/a.txt",
            ]
        "#]]
        .assert_debug_eq(
            &cache
                .cached_paths()
                .iter()
                .map(|path| path.to_string())
                .collect::<Vec<_>>(),
        );
    }

    #[test]
    fn test_preload_then_load_performs_no_extra_read() {
        let mock = MockPal::new();
        mock.add_file("/a.txt", b"a".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        cache.preload("/a.txt").unwrap();
        assert_eq!(mock.read_count("/a.txt"), 1);

        assert_eq!(&*cache.load("/a.txt").unwrap(), b"a");
        assert_eq!(mock.read_count("/a.txt"), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().preloaded, 1);
    }

    #[test]
    fn test_preload_overwrites_existing_entry() {
        let mock = MockPal::new();
        mock.add_file("/a.txt", b"v1".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        cache.load("/a.txt").unwrap();
        mock.add_file("/a.txt", b"v2".to_vec());
        cache.preload("/a.txt").unwrap();

        assert_eq!(&*cache.load("/a.txt").unwrap(), b"v2");
    }

    #[test]
    fn test_preload_failure_leaves_store_unchanged() {
        let mock = MockPal::new();
        mock.add_unreadable("/flaky.bin");
        let cache = cache_with(&mock, CacheMode::Production);

        assert!(cache.preload("/missing").unwrap_err().is_not_found());
        assert!(cache.preload("/flaky.bin").unwrap_err().is_read());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_preload_batch_stops_at_first_failure() {
        let mock = MockPal::new();
        mock.add_file("/p1", b"one".to_vec());
        mock.add_file("/p3", b"three".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        let err = cache.preload_batch(["/p1", "/p2", "/p3"]).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(Path::new("/p2")));
        assert_eq!(
            err.to_string(),
            "Preload batch stopped at entry 1: File not found at /p2: no such file or directory"
        );
        assert!(cache.contains("/p1").unwrap());
        assert!(!cache.contains("/p3").unwrap());
        assert_eq!(mock.stat_count("/p3"), 0);
        assert_eq!(mock.read_count("/p3"), 0);
    }

    #[test]
    fn test_preload_batch_loads_everything() {
        let mock = MockPal::new().with_current_dir("/srv");
        mock.add_file("a", b"a".to_vec());
        mock.add_file("b", b"b".to_vec());
        mock.add_file("c", b"c".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        cache
            .preload_batch(vec!["a".to_string(), "/srv/b".to_string(), "./c".to_string()])
            .unwrap();

        assert_eq!(cache.len(), 3);
        for name in ["a", "b", "c"] {
            cache.load(name).unwrap();
        }
        assert_eq!(mock.total_reads(), 3);
    }

    #[test]
    fn test_preload_batch_empty_is_ok() {
        let cache = cache_with(&MockPal::new(), CacheMode::Production);
        cache.preload_batch(Vec::<String>::new()).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_preload_batch_populates_store_in_development() {
        let mock = MockPal::new();
        mock.add_file("/a", b"a".to_vec());
        let cache = cache_with(&mock, CacheMode::Development);

        cache.preload_batch(["/a"]).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lock_is_released_after_failed_batch() {
        let mock = MockPal::new();
        mock.add_file("/a", b"a".to_vec());
        let cache = cache_with(&mock, CacheMode::Production);

        assert!(cache.preload_batch(["/missing"]).is_err());
        // a held write lock would deadlock both calls
        cache.preload("/a").unwrap();
        assert_eq!(&*cache.load("/a").unwrap(), b"a");
    }

    #[test]
    fn test_concurrent_first_loads_agree() {
        let content: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let mock = MockPal::new();
        mock.add_file("/big.bin", content.clone());
        let cache = cache_with(&mock, CacheMode::Production);

        let results: Vec<Arc<[u8]>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| cache.load("/big.bin").unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        for result in &results {
            assert_eq!(&**result, content.as_slice());
        }
        assert_eq!(cache.len(), 1);
        let reads = mock.read_count("/big.bin");
        assert!((1..=16).contains(&reads), "reads = {}", reads);
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 16);
    }

    #[test]
    fn test_concurrent_loads_and_preloads_of_many_paths() {
        let mock = MockPal::new();
        for i in 0..32 {
            mock.add_file(format!("/f{}", i), format!("file {}", i).into_bytes());
        }
        let cache = cache_with(&mock, CacheMode::Production);

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let cache = &cache;
                scope.spawn(move || {
                    for i in 0..32 {
                        let path = format!("/f{}", (i + worker * 4) % 32);
                        if i % 5 == 0 {
                            cache.preload(&path).unwrap();
                        }
                        let content = cache.load(&path).unwrap();
                        assert!(content.starts_with(b"file "));
                    }
                });
            }
        });

        assert_eq!(cache.len(), 32);
        for i in 0..32 {
            let expected = format!("file {}", i);
            assert_eq!(&*cache.load(format!("/f{}", i)).unwrap(), expected.as_bytes());
        }
    }

    #[test]
    fn test_real_filesystem_modes() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("template.html");
        fs::write(&file, b"v1").unwrap();
        let pal = PalHandle::new(RealPal::with_base_dir(dir.path().to_path_buf()));
        let production = PathCache::with_pal(pal.clone(), CacheMode::Production);
        let development = PathCache::with_pal(pal, CacheMode::Development);

        assert_eq!(&*production.load("template.html").unwrap(), b"v1");
        assert_eq!(&*development.load("template.html").unwrap(), b"v1");

        fs::write(&file, b"v2").unwrap();

        assert_eq!(&*production.load(&file).unwrap(), b"v1");
        assert_eq!(&*development.load("./template.html").unwrap(), b"v2");
    }

    #[test]
    fn test_real_filesystem_missing_and_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let cache = PathCache::with_pal(
            PalHandle::new(RealPal::with_base_dir(dir.path().to_path_buf())),
            CacheMode::Production,
        );

        assert!(cache.load("missing.txt").unwrap_err().is_not_found());
        assert!(cache.load("sub").unwrap_err().is_read());
        assert!(cache.preload_batch(["sub"]).unwrap_err().is_read());
        assert!(cache.is_empty());
    }
}
