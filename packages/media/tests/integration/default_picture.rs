use media::{Picture, PictureType, UrlOptions};

use crate::common::{BASE_URL, TestMedia, dimensions, gif, jpeg};

mod fallback {
    use super::*;

    #[tokio::test]
    async fn missing_binary_falls_back_to_default_thumbnail() {
        let app = TestMedia::spawn().await;
        app.seed("images/default-image.gif", &gif(200, 100));
        let picture = Picture {
            id: 3,
            mime_type: "image/png".into(),
            ..Picture::default()
        };

        let url = app
            .service
            .picture_url(Some(&picture), UrlOptions::sized(50))
            .await;

        assert_eq!(url, format!("{BASE_URL}/images/thumbs/default-image_50.gif"));
        let thumb = std::fs::read(app.path("images/thumbs/default-image_50.gif")).unwrap();
        assert_eq!(dimensions(&thumb), (50, 25));
    }

    #[tokio::test]
    async fn full_size_default_points_at_original() {
        let app = TestMedia::spawn().await;
        app.seed("images/default-image.gif", &gif(10, 10));

        let url = app.service.default_picture_url(0, PictureType::Entity).await;
        assert_eq!(url, format!("{BASE_URL}/images/default-image.gif"));
        assert!(app.thumb_files().is_empty());
    }

    #[tokio::test]
    async fn avatar_uses_avatar_default() {
        let app = TestMedia::spawn().await;
        app.seed("images/default-avatar.jpg", &jpeg(10, 10));

        let url = app
            .service
            .picture_url(None, UrlOptions::sized(5).avatar())
            .await;
        assert_eq!(url, format!("{BASE_URL}/images/thumbs/default-avatar_5.jpg"));
    }

    #[tokio::test]
    async fn missing_default_file_yields_empty_url() {
        let app = TestMedia::spawn().await;

        assert_eq!(
            app.service
                .try_default_picture_url(100, PictureType::Entity)
                .await
                .unwrap(),
            None
        );
        assert_eq!(app.service.picture_url(None, UrlOptions::sized(100)).await, "");
    }

    #[tokio::test]
    async fn no_fallback_when_disabled() {
        let app = TestMedia::spawn().await;
        app.seed("images/default-image.gif", &gif(10, 10));

        let url = app
            .service
            .picture_url(None, UrlOptions::sized(5).without_default())
            .await;
        assert_eq!(url, "");
    }
}
