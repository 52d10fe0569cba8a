use std::time::Duration;

use media::cache::names;

use crate::common::TestMedia;

mod text_cache {
    use super::*;

    #[tokio::test]
    async fn shares_the_picture_web_root() {
        let app = TestMedia::spawn().await;
        let cache = app.cache();

        cache
            .write_cache("<nav/>", names::HOME_PAGE_LEFT_NAVIGATION, Some(Duration::from_secs(60)))
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(app.path("caches/homepage_leftnav.txt")).unwrap(),
            "<nav/>"
        );
        assert_eq!(
            cache.get_cache(names::HOME_PAGE_LEFT_NAVIGATION).await.unwrap(),
            "<nav/>"
        );
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let app = TestMedia::spawn().await;
        let cache = app.cache();

        cache.write_cache("first version", names::MEGA_MENU, None).await.unwrap();
        cache.write_cache("v2", names::MEGA_MENU, None).await.unwrap();

        assert_eq!(cache.get_cache(names::MEGA_MENU).await.unwrap(), "v2");
    }

    #[tokio::test]
    async fn filesystem_entries_never_expire() {
        let app = TestMedia::spawn().await;
        let cache = app.cache();

        cache
            .try_write_cache_array(4, names::CATEGORY_NAV, "nav", Some(Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(
            cache
                .try_get_cache_array(4, names::CATEGORY_NAV, true)
                .await
                .unwrap()
                .as_deref(),
            Some("nav")
        );
        assert!(app.path("caches/category_nav/4.txt").exists());
    }
}
